//! A single kinematic state on a motion profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::PROFILE_EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One dimensional kinematic state.
///
/// When used as a profile knot, `acc` is the constant acceleration of the
/// phase which begins at this knot.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Time in seconds
    pub t: f64,

    /// Position along the path in inches
    pub pos: f64,

    /// Velocity in inches/second
    pub vel: f64,

    /// Acceleration in inches/second^2
    pub acc: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionState {
    pub fn new(t: f64, pos: f64, vel: f64, acc: f64) -> Self {
        Self { t, pos, vel, acc }
    }

    /// State at time `t` assuming constant acceleration from this state.
    pub fn extrapolate(&self, t: f64) -> Self {
        let dt = t - self.t;
        Self::new(
            t,
            self.pos + self.vel * dt + 0.5 * self.acc * dt * dt,
            self.vel + self.acc * dt,
            self.acc,
        )
    }

    /// The earliest time at or after this state at which `pos` is reached
    /// under constant acceleration, or `None` if it is never reached.
    pub fn next_time_at_pos(&self, pos: f64) -> Option<f64> {
        let dp = pos - self.pos;

        if dp.abs() < PROFILE_EPSILON {
            return Some(self.t);
        }

        if self.acc.abs() < PROFILE_EPSILON {
            if self.vel.abs() < PROFILE_EPSILON {
                return None;
            }
            let dt = dp / self.vel;
            return if dt >= 0.0 { Some(self.t + dt) } else { None };
        }

        let disc = self.vel * self.vel + 2.0 * self.acc * dp;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();

        let roots = [
            (-self.vel + sqrt_disc) / self.acc,
            (-self.vel - sqrt_disc) / self.acc,
        ];

        roots
            .iter()
            .copied()
            .filter(|dt| *dt >= 0.0)
            .fold(None, |best: Option<f64>, dt| match best {
                Some(b) if b <= dt => Some(b),
                _ => Some(dt),
            })
            .map(|dt| self.t + dt)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_extrapolate() {
        let s = MotionState::new(1.0, 2.0, 3.0, 4.0);
        let e = s.extrapolate(2.0);
        assert_relative_eq!(e.pos, 2.0 + 3.0 + 2.0);
        assert_relative_eq!(e.vel, 7.0);
    }

    #[test]
    fn test_next_time_at_pos() {
        // From rest, a = 10, reaches 20 in after 2 s
        let s = MotionState::new(0.0, 0.0, 0.0, 10.0);
        assert_relative_eq!(s.next_time_at_pos(20.0).unwrap(), 2.0);

        // Cruise
        let c = MotionState::new(1.0, 10.0, 5.0, 0.0);
        assert_relative_eq!(c.next_time_at_pos(20.0).unwrap(), 3.0);
        assert!(c.next_time_at_pos(5.0).is_none());

        // Decelerating to a stop short of the target
        let d = MotionState::new(0.0, 0.0, 10.0, -10.0);
        assert!(d.next_time_at_pos(6.0).is_none());
        assert_relative_eq!(d.next_time_at_pos(5.0).unwrap(), 1.0, epsilon = 1e-6);
    }
}
