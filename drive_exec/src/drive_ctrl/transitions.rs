//! The drive mode transition table

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use drive_if::DriveMode;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// True if a transition from `from` to `to` may be made.
///
/// Open loop and trajectory following can always be entered. The velocity
/// mode can't interrupt a turn or vision steering, and a trajectory must be
/// finished before turning or vision steering can take over from it.
pub fn transition_allowed(from: DriveMode, to: DriveMode, follower_done: bool) -> bool {
    use DriveMode::*;

    match (to, from) {
        (OpenLoop, _) | (TrajectoryFollowing, _) => true,

        (VelocitySetpoint, OpenLoop)
        | (VelocitySetpoint, VelocitySetpoint)
        | (VelocitySetpoint, TrajectoryFollowing) => true,
        (VelocitySetpoint, _) => false,

        (TurnToHeading, TrajectoryFollowing) => follower_done,
        (TurnToHeading, VisionSteering) => false,
        (TurnToHeading, _) => true,

        (VisionSteering, TrajectoryFollowing) => follower_done,
        (VisionSteering, TurnToHeading) => false,
        (VisionSteering, _) => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use DriveMode::*;

    #[test]
    fn test_table() {
        for from in DriveMode::ALL.iter() {
            assert!(transition_allowed(*from, OpenLoop, false));
            assert!(transition_allowed(*from, TrajectoryFollowing, false));
        }

        assert!(transition_allowed(OpenLoop, VelocitySetpoint, false));
        assert!(transition_allowed(TrajectoryFollowing, VelocitySetpoint, false));
        assert!(!transition_allowed(TurnToHeading, VelocitySetpoint, true));
        assert!(!transition_allowed(VisionSteering, VelocitySetpoint, true));

        assert!(transition_allowed(OpenLoop, TurnToHeading, false));
        assert!(transition_allowed(TurnToHeading, TurnToHeading, false));
        assert!(!transition_allowed(TrajectoryFollowing, TurnToHeading, false));
        assert!(transition_allowed(TrajectoryFollowing, TurnToHeading, true));
        assert!(!transition_allowed(VisionSteering, TurnToHeading, true));

        assert!(transition_allowed(VelocitySetpoint, VisionSteering, false));
        assert!(!transition_allowed(TrajectoryFollowing, VisionSteering, false));
        assert!(transition_allowed(TrajectoryFollowing, VisionSteering, true));
        assert!(!transition_allowed(TurnToHeading, VisionSteering, true));
    }
}
