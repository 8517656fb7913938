//! Linear motor model for wheel feedforward

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Params;
use drive_if::DriveSignal;
use util::maths::sign;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Voltage needed to hold a wheel velocity and acceleration:
///
/// `V = kv * v + ka * a + v_intercept * sign(v)`
///
/// The intercept only applies while moving, so a stationary wheel with no
/// demanded acceleration gets no voltage.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MotorModel {
    pub kv: f64,
    pub ka: f64,
    pub v_intercept: f64,
    pub nominal_voltage: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorModel {
    pub fn from_params(params: &Params) -> Self {
        Self {
            kv: params.kv_v_per_ips,
            ka: params.ka_v_per_ips2,
            v_intercept: params.v_intercept_v,
            nominal_voltage: params.nominal_voltage_v,
        }
    }

    /// Voltage for a wheel velocity (in/s) and acceleration (in/s^2).
    pub fn voltage(&self, velocity_ips: f64, accel_ips2: f64) -> f64 {
        self.kv * velocity_ips + self.ka * accel_ips2 + self.v_intercept * sign(velocity_ips)
    }

    /// The voltage as a fraction of the nominal voltage.
    pub fn voltage_fraction(&self, velocity_ips: f64, accel_ips2: f64) -> f64 {
        if self.nominal_voltage > 0.0 {
            self.voltage(velocity_ips, accel_ips2) / self.nominal_voltage
        } else {
            0.0
        }
    }

    /// Feedforward voltage fractions for both sides.
    pub fn feedforward(&self, velocity_ips: &DriveSignal, accel_ips2: &DriveSignal) -> DriveSignal {
        DriveSignal::new(
            self.voltage_fraction(velocity_ips.left, accel_ips2.left),
            self.voltage_fraction(velocity_ips.right, accel_ips2.right),
        )
    }
}

impl Default for MotorModel {
    fn default() -> Self {
        Self::from_params(&Params::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_voltage() {
        let m = MotorModel {
            kv: 0.1,
            ka: 0.02,
            v_intercept: 0.5,
            nominal_voltage: 12.0,
        };

        assert_eq!(m.voltage(0.0, 0.0), 0.0);
        assert_relative_eq!(m.voltage(10.0, 0.0), 1.5);
        assert_relative_eq!(m.voltage(-10.0, 0.0), -1.5);
        assert_relative_eq!(m.voltage(10.0, 50.0), 2.5);

        // Accelerating from rest has no intercept
        assert_relative_eq!(m.voltage(0.0, 50.0), 1.0);

        assert_relative_eq!(m.voltage_fraction(10.0, 50.0), 2.5 / 12.0);

        let ff = m.feedforward(&DriveSignal::new(10.0, -10.0), &DriveSignal::NEUTRAL);
        assert_relative_eq!(ff.left, 1.5 / 12.0);
        assert_relative_eq!(ff.right, -1.5 / 12.0);
    }
}
