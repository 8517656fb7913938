//! # Drive kinematics
//!
//! Differential drive kinematics and the linear motor model used for wheel
//! feedforward. Everything here is pure and stateless.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod drive;
mod motor;
mod params;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use drive::DriveKinematics;
pub use motor::MotorModel;
pub use params::Params;
