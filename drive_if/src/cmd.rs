//! # Drive commands
//!
//! A [`DriveCommand`] is the only thing the drive core hands to the actuator
//! driver each tick. Quantities are physical (inches, inches/second and
//! fractions of nominal battery voltage); conversion to encoder ticks is the
//! driver's job.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{mode::ControlLaw, path_spec::PathSpec};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A pair of left/right wheel quantities.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveSignal {
    pub left: f64,
    pub right: f64,
}

/// The command sent to the actuator driver.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// The demand, tagged with its control law.
    pub demand: DriveDemand,

    /// If true the wheels should be held with the motor brake.
    pub brake: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A wheel demand. Each variant is paired with exactly one control law.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriveDemand {
    /// Voltage as a fraction of nominal battery voltage, in [-1, 1].
    Voltage { left: f64, right: f64 },

    /// Wheel velocities in inches/second with feedforward voltage fractions.
    Velocity {
        left_ips: f64,
        right_ips: f64,
        left_ff: f64,
        right_ff: f64,
    },

    /// Relative wheel travel in inches from the wheel positions at the time
    /// the demand was first issued.
    Position { left_in: f64, right_in: f64 },
}

/// A request made to the drive unit by its user (operator interface, autonomy
/// or the executable's script).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DriveRequest {
    /// Drive open loop with the given voltage fractions.
    OpenLoop(DriveSignal),

    /// Drive with the given wheel velocities in inches/second.
    Velocity(DriveSignal),

    /// Build a trajectory from the path and start following it.
    FollowPath(PathSpec),

    /// Turn on the spot to the given field heading.
    TurnToHeading { heading_rad: f64 },

    /// Steer towards the vision target, with an operator throttle in [-1, 1].
    ///
    /// A throttle of zero lets the unit pick a throttle from the target size.
    VisionSteering { throttle: f64 },

    /// Abandon the active trajectory and hold a brake command.
    OverrideTrajectory,

    /// Cancel the current mode and return to open loop with zero output.
    Cancel,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DriveSignal {
    pub const NEUTRAL: DriveSignal = DriveSignal { left: 0.0, right: 0.0 };

    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Largest absolute value of the two sides.
    pub fn max_abs(&self) -> f64 {
        self.left.abs().max(self.right.abs())
    }

    /// Scale both sides down so that neither exceeds `limit`, keeping their
    /// ratio.
    pub fn normalised(&self, limit: f64) -> Self {
        let max = self.max_abs();
        if max > limit && max > 0.0 {
            Self::new(self.left * limit / max, self.right * limit / max)
        } else {
            *self
        }
    }
}

impl DriveDemand {
    /// The control law the demand must be executed with.
    pub fn control_law(&self) -> ControlLaw {
        match self {
            DriveDemand::Voltage { .. } => ControlLaw::Voltage,
            DriveDemand::Velocity { .. } => ControlLaw::Velocity,
            DriveDemand::Position { .. } => ControlLaw::Position,
        }
    }

    /// Voltage demand from a signal.
    pub fn voltage(signal: DriveSignal) -> Self {
        DriveDemand::Voltage {
            left: signal.left,
            right: signal.right,
        }
    }

    /// Velocity demand from wheel velocities and feedforward voltages.
    pub fn velocity(velocity_ips: DriveSignal, feedforward: DriveSignal) -> Self {
        DriveDemand::Velocity {
            left_ips: velocity_ips.left,
            right_ips: velocity_ips.right,
            left_ff: feedforward.left,
            right_ff: feedforward.right,
        }
    }

    /// Position demand from wheel travel.
    pub fn position(travel_in: DriveSignal) -> Self {
        DriveDemand::Position {
            left_in: travel_in.left,
            right_in: travel_in.right,
        }
    }
}

impl DriveCommand {
    /// Stationary, brake released, zero voltage. The safe default.
    pub fn neutral() -> Self {
        Self {
            demand: DriveDemand::voltage(DriveSignal::NEUTRAL),
            brake: false,
        }
    }

    /// Zero velocity with the brake applied.
    pub fn brake() -> Self {
        Self {
            demand: DriveDemand::velocity(DriveSignal::NEUTRAL, DriveSignal::NEUTRAL),
            brake: true,
        }
    }

    pub fn new(demand: DriveDemand) -> Self {
        Self {
            demand,
            brake: false,
        }
    }

    pub fn control_law(&self) -> ControlLaw {
        self.demand.control_law()
    }
}

impl Default for DriveCommand {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_safe_commands() {
        let neutral = DriveCommand::neutral();
        assert_eq!(neutral.control_law(), ControlLaw::Voltage);
        assert!(!neutral.brake);
        assert_eq!(neutral, DriveCommand::default());

        let brake = DriveCommand::brake();
        assert_eq!(brake.control_law(), ControlLaw::Velocity);
        assert!(brake.brake);
    }

    #[test]
    fn test_normalise() {
        let s = DriveSignal::new(2.0, -1.0).normalised(1.0);
        assert_eq!(s, DriveSignal::new(1.0, -0.5));

        let s = DriveSignal::new(0.5, -0.25).normalised(1.0);
        assert_eq!(s, DriveSignal::new(0.5, -0.25));
    }

    #[test]
    fn test_request_json() {
        let req: DriveRequest =
            serde_json::from_str(r#"{"TurnToHeading": {"heading_rad": 1.5}}"#).unwrap();
        match req {
            DriveRequest::TurnToHeading { heading_rad } => assert_eq!(heading_rad, 1.5),
            r => panic!("Unexpected request {:?}", r),
        }
    }
}
