//! # Drive base interface
//!
//! A drive base is the hardware (or simulation) side of a drive unit. It
//! supplies the inputs for each tick and executes the resulting command.
//! Each drive base is paired with a [`Drivetrain`](crate::drivetrain::Drivetrain)
//! in the [`Scheduler`](crate::scheduler::Scheduler).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use drive_if::{DriveCommand, DriveInputs, DriveMode};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

pub trait DriveBase: Send {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Read the pose estimate, timestamp and vision target for this tick.
    fn read_inputs(&mut self) -> Result<DriveInputs, DriveBaseError>;

    /// Execute the command produced this tick.
    fn write_outputs(&mut self, cmd: &DriveCommand) -> Result<(), DriveBaseError>;

    /// Called on the tick a mode is entered, before its command is written.
    fn on_mode_enter(&mut self, _mode: DriveMode) {}

    /// Called on the tick a mode is left, before `on_mode_enter`.
    fn on_mode_exit(&mut self, _mode: DriveMode) {}
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DriveBaseError {
    #[error("The drive base is not connected")]
    NotConnected,

    #[error("The drive base rejected the command: {0}")]
    CommandRejected(String),
}
