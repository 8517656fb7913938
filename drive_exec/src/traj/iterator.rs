//! Time cursor over a shared trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use super::{TimedState, Trajectory};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Forward walk length after which the cursor falls back to a binary search.
const MAX_LINEAR_STEPS: usize = 8;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Cursor over a trajectory, tracking progress in time.
///
/// Progress is always within the trajectory's time range. Advancing past the
/// end holds the cursor at the final state.
#[derive(Debug, Clone)]
pub struct TrajectoryIterator {
    traj: Arc<Trajectory>,
    progress: f64,
    index: usize,
    current: TimedState,
}

/// Iterator yielding trajectory states at a fixed time step, ending with the
/// final state.
#[derive(Debug)]
pub struct Steps {
    iter: TrajectoryIterator,
    dt: f64,
    finished: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryIterator {
    pub fn new(traj: Arc<Trajectory>) -> Self {
        let current = *traj.first();
        let progress = traj.start_time();
        Self {
            traj,
            progress,
            index: 0,
            current,
        }
    }

    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.traj
    }

    /// Time along the trajectory.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Time left until the end of the trajectory.
    pub fn remaining(&self) -> f64 {
        (self.traj.end_time() - self.progress).max(0.0)
    }

    pub fn is_done(&self) -> bool {
        self.remaining() <= 0.0
    }

    pub fn current(&self) -> &TimedState {
        &self.current
    }

    /// Advance by `dt` seconds and return the new state.
    pub fn advance(&mut self, dt: f64) -> TimedState {
        self.advance_to(self.progress + dt)
    }

    /// The state `dt` seconds ahead, without moving the cursor.
    pub fn preview(&self, dt: f64) -> TimedState {
        self.traj.sample(self.progress + dt)
    }

    /// Move to time `t`, clamped to the trajectory, and return the state.
    pub fn advance_to(&mut self, t: f64) -> TimedState {
        let t = t.max(self.traj.start_time()).min(self.traj.end_time());
        self.index = self.index_at(t);
        self.progress = t;
        self.current = if t >= self.traj.end_time() {
            *self.traj.last()
        } else if t <= self.traj.start_time() {
            *self.traj.first()
        } else {
            self.traj.interpolate_at(self.index, t)
        };
        self.current
    }

    /// Back to the start of the trajectory.
    pub fn reset(&mut self) {
        self.progress = self.traj.start_time();
        self.index = 0;
        self.current = *self.traj.first();
    }

    /// States every `dt` seconds from the current position to the end.
    pub fn steps(self, dt: f64) -> Steps {
        Steps {
            iter: self,
            dt,
            finished: false,
        }
    }

    /// Index of the last state at or before `t`.
    fn index_at(&self, t: f64) -> usize {
        let states = self.traj.states();

        // Small forward steps are the common case, walk from the cached index
        if t >= states[self.index].t {
            let mut idx = self.index;
            for _ in 0..MAX_LINEAR_STEPS {
                match states.get(idx + 1) {
                    Some(next) if next.t <= t => idx += 1,
                    _ => return idx,
                }
            }
        }

        states.partition_point(|s| s.t <= t).saturating_sub(1)
    }
}

impl Iterator for Steps {
    type Item = TimedState;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let state = *self.iter.current();
        if self.iter.is_done() || self.dt <= 0.0 {
            self.finished = true;
        } else {
            self.iter.advance(self.dt);
        }
        Some(state)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::{Params, PathBuilder, Waypoint};
    use approx::assert_relative_eq;

    fn traj() -> Arc<Trajectory> {
        PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(60.0, 0.0, 0.0, 20.0))
            .waypoint(Waypoint::new(60.0, 60.0, 0.0, 0.0))
            .build_trajectory(&Params {
                max_vel_ips: 40.0,
                max_accel_ips2: 30.0,
                max_centripetal_accel_ips2: 50.0,
                max_dx_in: 2.0,
            })
            .unwrap()
    }

    #[test]
    fn test_matches_sample() {
        let traj = traj();
        let mut it = traj.iter();
        assert_eq!(*it.current(), *traj.first());

        let mut t: f64 = 0.0;
        while !it.is_done() {
            let s = it.advance(0.01);
            t += 0.01;
            let expected = traj.sample(t.min(traj.end_time()));
            assert_relative_eq!(s.t, expected.t, epsilon = 1e-9);
            assert_relative_eq!(s.velocity, expected.velocity, epsilon = 1e-9);
            assert!(s
                .state
                .pose
                .epsilon_eq(&expected.state.pose, 1e-9));
        }

        assert_eq!(*it.current(), *traj.last());
        assert_eq!(it.remaining(), 0.0);
    }

    #[test]
    fn test_jumps_and_reset() {
        let traj = traj();
        let mut it = traj.iter();

        let mid = traj.duration() / 2.0;
        assert_eq!(it.preview(mid), traj.sample(mid));
        assert_eq!(it.progress(), 0.0);

        // Large jump forward then backwards
        assert_eq!(it.advance_to(mid), traj.sample(mid));
        assert_eq!(it.advance_to(0.1), traj.sample(0.1));

        assert_eq!(it.advance(1000.0), *traj.last());
        assert!(it.is_done());

        it.reset();
        assert_eq!(it.progress(), 0.0);
        assert_eq!(*it.current(), *traj.first());
        assert!(!it.is_done());
    }

    #[test]
    fn test_steps() {
        let traj = traj();
        let states: Vec<TimedState> = traj.iter().steps(0.1).collect();

        assert_eq!(states[0], *traj.first());
        assert_eq!(*states.last().unwrap(), *traj.last());
        for w in states.windows(2) {
            assert!(w[1].t > w[0].t);
        }
        let steps = traj.duration() / 0.1;
        assert!(states.len() as f64 >= steps + 1.0 - 1e-6);
        assert!(states.len() as f64 <= steps + 2.0 + 1e-6);
    }
}
