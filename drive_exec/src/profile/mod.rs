//! # Motion profiles
//!
//! A motion profile is a one dimensional time/position/velocity/acceleration
//! plan along the arc length of a path. Profiles are generated under a set of
//! timing constraints which limit velocity and acceleration as a function of
//! the path state (pose and curvature) at each point.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod constraints;
mod generator;
mod motion_profile;
mod motion_state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use constraints::{
    AccelBounds, CentripetalAcceleration, ConstraintSet, MaxAcceleration, SegmentSpeedLimit,
    TimingConstraint, VelocityLimit,
};
pub use generator::{generate_profile, ProfileGoal};
pub use motion_profile::MotionProfile;
pub use motion_state::MotionState;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Velocities, positions and times closer than this are considered equal.
pub const PROFILE_EPSILON: f64 = 1e-6;
