//! # Planar geometry
//!
//! Rigid body primitives for a robot moving on the field plane. All lengths
//! are in inches and angles in radians, counter-clockwise positive about the
//! field Z+ axis.
//!
//! The pose exponential and logarithm treat a pose change as motion along a
//! constant curvature arc, which is how the path and trajectory modules
//! interpolate between samples.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod path_state;
mod pose;
mod rotation;
mod translation;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use path_state::PathState;
pub use pose::{Pose2d, Twist2d};
pub use rotation::Rotation2d;
pub use translation::Translation2d;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance used for geometric comparisons.
pub const GEOM_EPSILON: f64 = 1e-9;
