//! Path and trajectory generation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for path and trajectory generation
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Maximum velocity along any path, in inches/second
    pub max_vel_ips: f64,

    /// Maximum forwards and braking acceleration, in inches/second^2
    pub max_accel_ips2: f64,

    /// Maximum centripetal acceleration, in inches/second^2
    pub max_centripetal_accel_ips2: f64,

    /// Maximum distance between trajectory samples, in inches
    pub max_dx_in: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_vel_ips: 120.0,
            max_accel_ips2: 100.0,
            max_centripetal_accel_ips2: 100.0,
            max_dx_in: 2.0,
        }
    }
}
