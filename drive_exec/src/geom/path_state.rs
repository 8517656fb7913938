//! A pose on a path, annotated with curvature and distance

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{Pose2d, Rotation2d, Translation2d};
use util::maths::interpolate;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sample of a geometric path.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathState {
    pub pose: Pose2d,

    /// Curvature in 1/inches, positive for a left turn.
    pub curvature: f64,

    /// Arc length from the start of the path in inches.
    pub distance: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathState {
    pub fn new(pose: Pose2d, curvature: f64, distance: f64) -> Self {
        Self {
            pose,
            curvature,
            distance,
        }
    }

    pub fn translation(&self) -> Translation2d {
        self.pose.translation
    }

    pub fn rotation(&self) -> Rotation2d {
        self.pose.rotation
    }

    /// Interpolate towards `other`. The pose follows the constant curvature
    /// arc between the two, curvature and distance are linear.
    pub fn interpolate(&self, other: &PathState, x: f64) -> Self {
        Self::new(
            self.pose.interpolate(&other.pose, x),
            interpolate(self.curvature, other.curvature, x),
            interpolate(self.distance, other.distance, x),
        )
    }

    /// Arc length between the two states' poses.
    pub fn distance_to(&self, other: &PathState) -> f64 {
        self.pose.distance(&other.pose)
    }

    /// The same state driven backwards: heading flipped and curvature negated.
    pub fn reversed(&self) -> Self {
        Self::new(self.pose.mirror(), -self.curvature, self.distance)
    }
}
