//! # Drive control module
//!
//! Drive control owns the drive mode state machine. It decides each tick which
//! control law governs the wheels and produces the command for it, either
//! directly from an operator setpoint (open loop and velocity modes) or from
//! one of its closed loop controllers (trajectory following, turning to a
//! heading and vision steering).
//!
//! Mode changes are requested through the `set_xyz` functions and checked
//! against the transition table in [`transitions`]. Every transition clears
//! the state of the mode being left and re-arms the mode being entered, so
//! nothing from a previous mode leaks into the next one.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
pub mod transitions;
mod turn;
mod vision;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::*;
pub use turn::TurnState;
pub use vision::VisionState;
