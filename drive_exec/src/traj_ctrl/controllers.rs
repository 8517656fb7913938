//! # Trajectory controllers
//!
//! The nonlinear tracking law used to correct the setpoint velocity and turn
//! rate from the robot frame pose error.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::geom::{Pose2d, Twist2d};
use util::maths::sinc;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ramsete unicycle tracking controller.
///
/// With setpoint velocity `v_d` and turn rate `w_d`, and robot frame errors
/// `e_x`, `e_y` and `e_theta`:
///
/// ```text
/// k = 2 * zeta * sqrt(w_d^2 + b * v_d^2)
/// v = v_d * cos(e_theta) + k * e_x
/// w = w_d + k * e_theta + b * v_d * sinc(e_theta) * e_y
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Ramsete {
    b: f64,
    zeta: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Ramsete {
    pub fn new(b: f64, zeta: f64) -> Self {
        Self { b, zeta }
    }

    pub fn from_params(params: &super::Params) -> Self {
        Self::new(params.ramsete_b_per_in2, params.ramsete_zeta)
    }

    /// The corrected chassis velocity (`dx`) and turn rate (`dtheta`).
    ///
    /// `error` is the setpoint pose expressed in the robot frame.
    pub fn calculate(&self, error: &Pose2d, v_d: f64, w_d: f64) -> Twist2d {
        let e_x = error.translation.x();
        let e_y = error.translation.y();
        let e_theta = error.rotation.radians();

        let k = 2.0 * self.zeta * (w_d * w_d + self.b * v_d * v_d).sqrt();

        Twist2d::new(
            v_d * e_theta.cos() + k * e_x,
            0.0,
            w_d + k * e_theta + self.b * v_d * sinc(e_theta) * e_y,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_error_passes_through() {
        let r = Ramsete::new(0.0013, 0.7);
        let t = r.calculate(&Pose2d::identity(), 40.0, 0.5);
        assert_relative_eq!(t.dx, 40.0);
        assert_relative_eq!(t.dtheta, 0.5);

        let t = r.calculate(&Pose2d::identity(), -40.0, 0.5);
        assert_relative_eq!(t.dx, -40.0);
        assert_relative_eq!(t.dtheta, 0.5);
    }

    #[test]
    fn test_corrections() {
        let r = Ramsete::new(0.0013, 0.7);

        // Setpoint ahead, speed up
        let t = r.calculate(&Pose2d::from_xy_heading(2.0, 0.0, 0.0), 40.0, 0.0);
        assert!(t.dx > 40.0);
        assert_relative_eq!(t.dtheta, 0.0);

        // Setpoint to the left, turn left
        let t = r.calculate(&Pose2d::from_xy_heading(0.0, 2.0, 0.0), 40.0, 0.0);
        assert_relative_eq!(t.dx, 40.0);
        assert!(t.dtheta > 0.0);

        // Setpoint to the left while reversing, turn right so the back swings
        // left
        let t = r.calculate(&Pose2d::from_xy_heading(0.0, 2.0, 0.0), -40.0, 0.0);
        assert!(t.dtheta < 0.0);

        // Setpoint rotated clockwise, turn right
        let t = r.calculate(&Pose2d::from_xy_heading(0.0, 0.0, -0.1), 40.0, 0.0);
        assert!(t.dtheta < 0.0);
        assert!(t.dx < 40.0);
    }
}
