//! # Drive modes

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The low level control law the actuator driver must run for a demand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlLaw {
    /// Voltage as a fraction of nominal battery voltage, in [-1, 1].
    Voltage,

    /// Closed loop wheel velocity with an additive feedforward voltage.
    Velocity,

    /// Closed loop relative wheel position.
    Position,
}

/// The currently authoritative control law governing command generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveMode {
    /// Direct left/right voltage fractions from the operator.
    OpenLoop,

    /// Direct left/right wheel velocities.
    VelocitySetpoint,

    /// Closed loop following of a planned trajectory.
    TrajectoryFollowing,

    /// Rotate on the spot to hold or acquire a heading.
    TurnToHeading,

    /// Steer towards a vision target using its angular offset.
    VisionSteering,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DriveMode {
    /// All modes, in declaration order.
    pub const ALL: [DriveMode; 5] = [
        DriveMode::OpenLoop,
        DriveMode::VelocitySetpoint,
        DriveMode::TrajectoryFollowing,
        DriveMode::TurnToHeading,
        DriveMode::VisionSteering,
    ];

    /// The control law every command produced in this mode must use.
    pub const fn control_law(self) -> ControlLaw {
        match self {
            DriveMode::OpenLoop => ControlLaw::Voltage,
            DriveMode::VelocitySetpoint => ControlLaw::Velocity,
            DriveMode::TrajectoryFollowing => ControlLaw::Velocity,
            DriveMode::TurnToHeading => ControlLaw::Position,
            DriveMode::VisionSteering => ControlLaw::Voltage,
        }
    }
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::OpenLoop
    }
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriveMode::OpenLoop => "OPEN_LOOP",
            DriveMode::VelocitySetpoint => "VELOCITY_SETPOINT",
            DriveMode::TrajectoryFollowing => "TRAJECTORY_FOLLOWING",
            DriveMode::TurnToHeading => "TURN_TO_HEADING",
            DriveMode::VisionSteering => "VISION_STEERING",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_control_law_pairing() {
        assert_eq!(DriveMode::OpenLoop.control_law(), ControlLaw::Voltage);
        assert_eq!(DriveMode::VelocitySetpoint.control_law(), ControlLaw::Velocity);
        assert_eq!(DriveMode::TrajectoryFollowing.control_law(), ControlLaw::Velocity);
        assert_eq!(DriveMode::TurnToHeading.control_law(), ControlLaw::Position);
        assert_eq!(DriveMode::VisionSteering.control_law(), ControlLaw::Voltage);
        assert_eq!(DriveMode::default(), DriveMode::OpenLoop);
        assert_eq!(format!("{}", DriveMode::TurnToHeading), "TURN_TO_HEADING");
    }
}
