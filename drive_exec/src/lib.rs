//! # Drive library.
//!
//! Motion planning and following for a differential drive base. Paths are
//! built from waypoints, time-parameterised into trajectories under a set of
//! timing constraints and followed with a Ramsete controller. The drive
//! controller arbitrates between the driving modes and produces one command
//! per tick for the drive base.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Planar geometry - poses, rotations, twists and path states
pub mod geom;

/// Path segments and the path builder
pub mod path;

/// Motion profiles and timing constraints
pub mod profile;

/// Time-parameterised trajectories and their iterators
pub mod traj;

/// Differential drive kinematics and the motor feedforward model
pub mod kinematics;

/// Trajectory control - keeps the robot on the active trajectory
pub mod traj_ctrl;

/// Drive control - mode arbitration and command generation
pub mod drive_ctrl;

/// Interface to the hardware or simulation driving the wheels
pub mod drive_base;

/// Thread safe wrapper around drive control for one drive unit
pub mod drivetrain;

/// Ticks each drive unit against its drive base
pub mod scheduler;

/// Simulated drive base
pub mod sim;
