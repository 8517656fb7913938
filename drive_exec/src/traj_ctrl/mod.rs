//! # Trajectory control module
//!
//! Trajectory control keeps the robot on the active trajectory. Each tick the
//! trajectory is sampled at the time elapsed since following began, giving a
//! setpoint pose, curvature, velocity and acceleration.
//!
//! The error between the setpoint and the measured pose is expressed in the
//! robot frame as a longitudinal (along the robot's heading), lateral and
//! heading error. A Ramsete controller turns the error into a corrected
//! chassis velocity and turn rate, which the drive kinematics split into left
//! and right wheel velocities. The setpoint velocity and acceleration are
//! also passed through the motor model to give each wheel a feedforward
//! voltage.
//!
//! The follower aborts the trajectory and brakes if the lateral or heading
//! error exceeds its limit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use controllers::Ramsete;
pub use params::Params;
pub use state::*;
