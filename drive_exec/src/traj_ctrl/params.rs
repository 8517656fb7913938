//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control, loaded from `traj_ctrl.toml`.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Ramsete convergence gain. Larger values correct errors more
    /// aggressively.
    ///
    /// Units: 1/inches^2
    pub ramsete_b_per_in2: f64,

    /// Ramsete damping ratio, between 0 and 1.
    pub ramsete_zeta: f64,

    /// Positional error under which the follower finishes once the end of the
    /// trajectory has been reached.
    ///
    /// Units: inches
    pub done_tolerance_in: f64,

    /// The limit on lateral error. Above this limit the trajectory is aborted.
    ///
    /// Units: inches
    pub lat_error_limit_in: f64,

    /// The limit on heading error. Above this limit the trajectory is aborted.
    ///
    /// Units: radians
    pub head_error_limit_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            ramsete_b_per_in2: 0.0013,
            ramsete_zeta: 0.7,
            done_tolerance_in: 2.0,
            lat_error_limit_in: 24.0,
            head_error_limit_rad: 0.8,
        }
    }
}
