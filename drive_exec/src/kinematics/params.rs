//! Parameters for the drive kinematics and motor model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic and motor model parameters, loaded from `kinematics.toml`.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Distance between the left and right wheel contact patches.
    ///
    /// Units: inches
    pub track_width_in: f64,

    /// Multiplier on the track width accounting for wheel scrub when turning.
    /// 1.0 is an ideal drive.
    pub scrub_factor: f64,

    // ---- MOTOR MODEL ----
    /// Voltage per unit wheel velocity.
    ///
    /// Units: volts/(inches/second)
    pub kv_v_per_ips: f64,

    /// Voltage per unit wheel acceleration.
    ///
    /// Units: volts/(inches/second^2)
    pub ka_v_per_ips2: f64,

    /// Voltage needed to overcome static friction.
    ///
    /// Units: volts
    pub v_intercept_v: f64,

    /// Battery voltage that voltage fractions are relative to.
    ///
    /// Units: volts
    pub nominal_voltage_v: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            track_width_in: 25.5,
            scrub_factor: 1.0,
            kv_v_per_ips: 0.15919001960377988,
            ka_v_per_ips2: 0.02429265696741975,
            v_intercept_v: 0.6225547106218224,
            nominal_voltage_v: 12.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let p: Params = util::params::parse(
            r#"
            track_width_in = 26.0
            scrub_factor = 1.158
            kv_v_per_ips = 0.16
            ka_v_per_ips2 = 0.024
            v_intercept_v = 0.62
            nominal_voltage_v = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(p.track_width_in, 26.0);
        assert_eq!(p.scrub_factor, 1.158);
    }
}
