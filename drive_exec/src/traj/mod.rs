//! # Trajectories
//!
//! A trajectory is a path annotated with a motion profile: an ordered list of
//! timed states, each giving the pose, curvature, velocity and acceleration
//! the robot should have at a time. Acceleration is constant between
//! consecutive states, which lets the trajectory be sampled exactly at any
//! time in between.
//!
//! Trajectories are immutable and are shared as `Arc<Trajectory>`; replacing
//! the active trajectory is always a swap of the whole thing.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod iterator;
mod timed_state;
mod trajectory;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use iterator::{Steps, TrajectoryIterator};
pub use timed_state::TimedState;
pub use trajectory::Trajectory;

use crate::path::PathError;

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    #[error("A trajectory must contain at least one state")]
    Empty,

    #[error("State {index} is not later than the state before it")]
    NonMonotonicTime { index: usize },

    #[error("State {index} is closer to the start of the path than the state before it")]
    NonMonotonicDistance { index: usize },
}
