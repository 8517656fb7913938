//! # Drive interface crate.
//!
//! Provides the types which cross the boundary of the drive core: the
//! commands handed to the actuator driver, the inputs supplied by
//! localisation, mode requests, telemetry snapshots and path authoring files.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive commands, demands and requests
pub mod cmd;

/// Per-tick inputs from localisation and vision
pub mod inputs;

/// Drive modes and the control laws they use
pub mod mode;

/// Path authoring files
pub mod path_spec;

/// Telemetry snapshots
pub mod tm;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use cmd::*;
pub use inputs::*;
pub use mode::*;
pub use path_spec::*;
pub use tm::*;
