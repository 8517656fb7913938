//! Turn to heading

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::geom::{Rotation2d, Twist2d};
use crate::kinematics::DriveKinematics;
use drive_if::DriveSignal;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of an on-the-spot turn to a field heading.
///
/// The wheel travel needed to reach the target is worked out on the first
/// update and held as a relative position demand until the heading is within
/// tolerance.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TurnState {
    target: Rotation2d,
    travel_in: Option<DriveSignal>,
    on_target: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TurnState {
    pub fn new(target_heading_rad: f64) -> Self {
        Self {
            target: Rotation2d::from_radians(target_heading_rad),
            travel_in: None,
            on_target: false,
        }
    }

    pub fn target(&self) -> &Rotation2d {
        &self.target
    }

    pub fn is_on_target(&self) -> bool {
        self.on_target
    }

    /// Aim at a new heading, discarding the wheel travel for the old one.
    pub fn retarget(&mut self, target_heading_rad: f64) {
        *self = Self::new(target_heading_rad);
    }

    /// Wheel travel to demand this tick, or `None` once on target.
    pub fn update(
        &mut self,
        heading: &Rotation2d,
        kinematics: &DriveKinematics,
        tolerance_rad: f64,
    ) -> Option<DriveSignal> {
        let error_rad = heading.inverse().rotate_by(&self.target).radians();

        if error_rad.abs() < tolerance_rad {
            self.on_target = true;
            return None;
        }

        Some(
            *self
                .travel_in
                .get_or_insert_with(|| kinematics.inverse(&Twist2d::new(0.0, 0.0, error_rad))),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_turn() {
        let k = DriveKinematics::new(20.0, 1.0);
        let mut turn = TurnState::new(PI / 2.0);

        let travel = turn
            .update(&Rotation2d::identity(), &k, 0.05)
            .unwrap();
        assert_relative_eq!(travel.left, -5.0 * PI, epsilon = 1e-9);
        assert_relative_eq!(travel.right, 5.0 * PI, epsilon = 1e-9);

        // The travel is relative to where the turn started, it doesn't
        // change as the robot turns
        let held = turn
            .update(&Rotation2d::from_radians(0.5), &k, 0.05)
            .unwrap();
        assert_eq!(held, travel);
        assert!(!turn.is_on_target());

        assert!(turn
            .update(&Rotation2d::from_radians(PI / 2.0 - 0.01), &k, 0.05)
            .is_none());
        assert!(turn.is_on_target());
    }

    #[test]
    fn test_shortest_way_round() {
        let k = DriveKinematics::new(20.0, 1.0);

        // From 170 deg to -170 deg is 20 deg counter-clockwise
        let mut turn = TurnState::new((-170f64).to_radians());
        let travel = turn
            .update(&Rotation2d::from_degrees(170.0), &k, 0.01)
            .unwrap();
        assert!(travel.right > 0.0);
        assert_relative_eq!(travel.right, 10.0 * 20f64.to_radians(), epsilon = 1e-9);

        turn.retarget(0.0);
        assert!(turn.update(&Rotation2d::identity(), &k, 0.01).is_none());
    }
}
