//! # Telemetry snapshots
//!
//! The drive unit publishes one immutable [`DriveTm`] per tick. Readers get a
//! shared reference to the latest snapshot and never see a partial update.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{cmd::DriveCommand, mode::DriveMode};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Snapshot of the drive unit after a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveTm {
    /// Timestamp of the tick inputs in seconds.
    pub timestamp_s: f64,

    pub mode: DriveMode,

    /// True on the first tick after a mode transition.
    pub mode_changed: bool,

    pub follower: FollowerState,

    /// Following error in the robot frame, only populated while following.
    pub error: Option<TrackingError>,

    /// The setpoint sampled from the trajectory, only populated while following.
    pub setpoint: Option<SetpointTm>,

    /// The command sent to the actuator driver.
    pub cmd: DriveCommand,

    /// Names of trajectory markers passed so far.
    pub markers_passed: Vec<String>,
}

/// Pose error between the trajectory setpoint and the measured pose, expressed
/// in the robot frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingError {
    /// Longitudinal error, positive when the setpoint is ahead.
    pub x_in: f64,

    /// Lateral error, positive when the setpoint is to the left.
    pub y_in: f64,

    /// Heading error, positive when the setpoint is rotated counter-clockwise.
    pub theta_rad: f64,
}

/// The sampled trajectory setpoint.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetpointTm {
    pub t_s: f64,
    pub x_in: f64,
    pub y_in: f64,
    pub heading_rad: f64,
    pub curvature: f64,
    pub distance_in: f64,
    pub velocity_ips: f64,
    pub accel_ips2: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The trajectory follower's state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowerState {
    Idle,
    Following,
    Done,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for FollowerState {
    fn default() -> Self {
        FollowerState::Idle
    }
}

impl Default for DriveTm {
    fn default() -> Self {
        Self {
            timestamp_s: 0.0,
            mode: DriveMode::default(),
            mode_changed: false,
            follower: FollowerState::default(),
            error: None,
            setpoint: None,
            cmd: DriveCommand::neutral(),
            markers_passed: Vec::new(),
        }
    }
}
