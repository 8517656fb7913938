//! Motion profile knots and lookups

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{MotionState, PROFILE_EPSILON};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered sequence of knots, monotonic in position and strictly increasing
/// in time.
///
/// Each knot's acceleration holds until the next knot. The final knot always
/// has zero acceleration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MotionProfile {
    knots: Vec<MotionState>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionProfile {
    pub(crate) fn from_knots(knots: Vec<MotionState>) -> Self {
        Self { knots }
    }

    pub fn knots(&self) -> &[MotionState] {
        &self.knots
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    pub fn start_state(&self) -> Option<MotionState> {
        self.knots.first().copied()
    }

    pub fn end_state(&self) -> Option<MotionState> {
        self.knots.last().copied()
    }

    pub fn start_pos(&self) -> f64 {
        self.knots.first().map(|k| k.pos).unwrap_or(0.0)
    }

    pub fn end_pos(&self) -> f64 {
        self.knots.last().map(|k| k.pos).unwrap_or(0.0)
    }

    pub fn start_time(&self) -> f64 {
        self.knots.first().map(|k| k.t).unwrap_or(0.0)
    }

    pub fn end_time(&self) -> f64 {
        self.knots.last().map(|k| k.t).unwrap_or(0.0)
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Highest velocity reached by the profile.
    pub fn max_velocity(&self) -> f64 {
        self.knots.iter().map(|k| k.vel).fold(0.0, f64::max)
    }

    /// State at time `t`, or `None` if `t` is outside the profile.
    pub fn state_by_time(&self, t: f64) -> Option<MotionState> {
        let last = self.knots.last()?;
        if t < self.start_time() - PROFILE_EPSILON || t > last.t + PROFILE_EPSILON {
            return None;
        }
        if t >= last.t {
            return Some(*last);
        }

        // Index of the last knot at or before t
        let idx = self
            .knots
            .partition_point(|k| k.t <= t)
            .saturating_sub(1);

        Some(self.knots[idx].extrapolate(t))
    }

    /// The first state at which the profile reaches `pos`, or `None` if the
    /// position isn't covered by the profile.
    pub fn first_state_by_pos(&self, pos: f64) -> Option<MotionState> {
        let first = self.knots.first()?;
        let last = self.knots.last()?;

        if pos < first.pos - PROFILE_EPSILON || pos > last.pos + PROFILE_EPSILON {
            return None;
        }
        if (pos - last.pos).abs() < PROFILE_EPSILON {
            return Some(*last);
        }

        // Index of the last knot at or before pos
        let idx = self
            .knots
            .partition_point(|k| k.pos <= pos + PROFILE_EPSILON)
            .saturating_sub(1);
        let knot = &self.knots[idx];

        if (pos - knot.pos).abs() < PROFILE_EPSILON {
            return Some(*knot);
        }

        let t = knot.next_time_at_pos(pos)?;

        // Don't run past the next knot because of rounding
        let t = match self.knots.get(idx + 1) {
            Some(next) => t.min(next.t),
            None => t,
        };

        Some(knot.extrapolate(t))
    }
}
