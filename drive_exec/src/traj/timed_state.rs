//! Path states annotated with time, velocity and acceleration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::geom::{PathState, GEOM_EPSILON};
use crate::profile::PROFILE_EPSILON;
use util::maths::interpolate;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path state with the time, velocity and acceleration it's reached at.
///
/// `acceleration` is the constant acceleration between this state and the
/// next one in the trajectory. Velocity and acceleration are negative when
/// driving backwards.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct TimedState {
    pub state: PathState,
    pub t: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimedState {
    pub fn new(state: PathState, t: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            state,
            t,
            velocity,
            acceleration,
        }
    }

    /// True if this state is moving backwards, or is stopped and about to.
    pub fn is_reversing(&self) -> bool {
        self.velocity < 0.0
            || (self.velocity.abs() < PROFILE_EPSILON && self.acceleration < 0.0)
    }

    /// The state a fraction `x` of the way in time towards `other`.
    ///
    /// Velocity and displacement are integrated from this state under its
    /// acceleration. The displacement then places the pose along the path
    /// between the two states.
    pub fn interpolate(&self, other: &TimedState, x: f64) -> TimedState {
        let new_t = interpolate(self.t, other.t, x);
        let dt = new_t - self.t;
        if dt < 0.0 {
            return other.interpolate(self, 1.0 - x);
        }

        let direction = if self.is_reversing() { -1.0 } else { 1.0 };
        let new_v = self.velocity + self.acceleration * dt;
        let new_s = direction * (self.velocity * dt + 0.5 * self.acceleration * dt * dt);

        let distance = self.state.distance_to(&other.state);
        let fraction = if distance > GEOM_EPSILON {
            new_s / distance
        } else {
            x
        };

        TimedState::new(
            self.state.interpolate(&other.state, fraction),
            new_t,
            new_v,
            self.acceleration,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Pose2d;
    use approx::assert_relative_eq;

    fn straight(d: f64) -> PathState {
        PathState::new(Pose2d::from_xy_heading(d, 0.0, 0.0), 0.0, d)
    }

    #[test]
    fn test_accelerating() {
        // From rest at 10 in/s^2, reaching 20 in after 2 s
        let a = TimedState::new(straight(0.0), 0.0, 0.0, 10.0);
        let b = TimedState::new(straight(20.0), 2.0, 20.0, 0.0);

        let m = a.interpolate(&b, 0.5);
        assert_relative_eq!(m.t, 1.0);
        assert_relative_eq!(m.velocity, 10.0);
        assert_relative_eq!(m.state.distance, 5.0, epsilon = 1e-9);
        assert_relative_eq!(m.state.pose.translation.x(), 5.0, epsilon = 1e-9);

        // Reversed argument order gives the same point
        let r = b.interpolate(&a, 0.5);
        assert_relative_eq!(r.t, 1.0);
        assert_relative_eq!(r.state.distance, 5.0, epsilon = 1e-9);

        assert_eq!(a.interpolate(&b, 0.0), a);
    }

    #[test]
    fn test_reversing() {
        // Driving backwards, speeding up: velocity and acceleration negative
        let a = TimedState::new(straight(0.0).reversed(), 0.0, 0.0, -10.0);
        let b = TimedState::new(straight(20.0).reversed(), 2.0, -20.0, 0.0);
        assert!(a.is_reversing());

        let m = a.interpolate(&b, 0.5);
        assert_relative_eq!(m.velocity, -10.0);
        assert_relative_eq!(m.state.distance, 5.0, epsilon = 1e-9);
        assert_relative_eq!(m.state.pose.translation.x(), 5.0, epsilon = 1e-9);
    }
}
