//! Differential drive forward and inverse kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Params;
use crate::geom::{Rotation2d, Twist2d};
use drive_if::DriveSignal;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics of a differential (skid steer) drive base.
///
/// The effective track width is the measured track width scaled by the scrub
/// factor, which accounts for the extra wheel travel needed to turn a drive
/// whose wheels slip sideways.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DriveKinematics {
    track_width_in: f64,
    scrub_factor: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveKinematics {
    pub fn new(track_width_in: f64, scrub_factor: f64) -> Self {
        Self {
            track_width_in,
            scrub_factor,
        }
    }

    pub fn from_params(params: &Params) -> Self {
        Self::new(params.track_width_in, params.scrub_factor)
    }

    pub fn track_width_in(&self) -> f64 {
        self.track_width_in
    }

    pub fn scrub_factor(&self) -> f64 {
        self.scrub_factor
    }

    pub fn effective_track_width_in(&self) -> f64 {
        self.track_width_in * self.scrub_factor
    }

    /// Wheel velocities (or displacements) producing the chassis `twist`.
    ///
    /// The lateral component is ignored, a differential drive can't produce
    /// one.
    pub fn inverse(&self, twist: &Twist2d) -> DriveSignal {
        let delta = twist.dtheta * self.effective_track_width_in() / 2.0;
        DriveSignal::new(twist.dx - delta, twist.dx + delta)
    }

    /// Chassis twist produced by the wheel velocities (or displacements).
    pub fn forward(&self, wheels: &DriveSignal) -> Twist2d {
        let dx = (wheels.left + wheels.right) / 2.0;
        let dtheta = (wheels.right - wheels.left) / self.effective_track_width_in();
        Twist2d::new(dx, 0.0, dtheta)
    }

    /// Chassis twist from wheel displacements and a measured heading change,
    /// which is usually better than the rotation the wheels imply.
    pub fn forward_with_heading(&self, wheels: &DriveSignal, delta_heading: &Rotation2d) -> Twist2d {
        let dx = (wheels.left + wheels.right) / 2.0;
        Twist2d::new(dx, 0.0, delta_heading.radians())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip() {
        let k = DriveKinematics::new(25.5, 1.158);

        for twist in [
            Twist2d::new(0.0, 0.0, 0.0),
            Twist2d::new(50.0, 0.0, 0.0),
            Twist2d::new(0.0, 0.0, 2.0),
            Twist2d::new(-30.0, 0.0, 1.3),
            Twist2d::new(80.0, 0.0, -0.7),
        ]
        .iter()
        {
            let back = k.forward(&k.inverse(twist));
            assert_relative_eq!(back.dx, twist.dx, epsilon = 1e-12);
            assert_relative_eq!(back.dy, 0.0);
            assert_relative_eq!(back.dtheta, twist.dtheta, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inverse() {
        let k = DriveKinematics::new(20.0, 1.0);

        // Straight
        assert_eq!(
            k.inverse(&Twist2d::new(10.0, 0.0, 0.0)),
            DriveSignal::new(10.0, 10.0)
        );

        // Spin counter-clockwise on the spot
        assert_eq!(
            k.inverse(&Twist2d::new(0.0, 0.0, 1.0)),
            DriveSignal::new(-10.0, 10.0)
        );

        // Scrub makes the wheels travel further for the same rotation
        let k = DriveKinematics::new(20.0, 1.5);
        assert_eq!(
            k.inverse(&Twist2d::new(0.0, 0.0, 1.0)),
            DriveSignal::new(-15.0, 15.0)
        );
        assert_eq!(k.effective_track_width_in(), 30.0);
    }

    #[test]
    fn test_forward_with_heading() {
        let k = DriveKinematics::new(20.0, 1.0);
        let t = k.forward_with_heading(
            &DriveSignal::new(4.0, 6.0),
            &Rotation2d::from_radians(0.05),
        );
        assert_relative_eq!(t.dx, 5.0);
        assert_relative_eq!(t.dtheta, 0.05, epsilon = 1e-12);
    }
}
