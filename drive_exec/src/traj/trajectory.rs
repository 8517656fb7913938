//! Trajectory construction and sampling

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use log::info;
use serde::Serialize;

use super::{TimedState, TrajError, TrajectoryIterator};
use crate::path::{Marker, Params, Path};
use crate::profile::{
    generate_profile, CentripetalAcceleration, ConstraintSet, MaxAcceleration, MotionState,
    ProfileGoal, VelocityLimit, PROFILE_EPSILON,
};
use util::maths::limit;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An immutable, time-parameterised path.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    states: Vec<TimedState>,
    markers: Vec<Marker>,
    reversed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Create a trajectory from timed states.
    ///
    /// There must be at least one state, times must strictly increase and
    /// path distances must not decrease.
    pub fn new(
        states: Vec<TimedState>,
        markers: Vec<Marker>,
        reversed: bool,
    ) -> Result<Self, TrajError> {
        if states.is_empty() {
            return Err(TrajError::Empty);
        }

        for (i, w) in states.windows(2).enumerate() {
            if w[1].t <= w[0].t {
                return Err(TrajError::NonMonotonicTime { index: i + 1 });
            }
            if w[1].state.distance < w[0].state.distance {
                return Err(TrajError::NonMonotonicDistance { index: i + 1 });
            }
        }

        Ok(Self {
            states,
            markers,
            reversed,
        })
    }

    /// Time-parameterise a path.
    ///
    /// The whole path is profiled at once under the global acceleration,
    /// velocity and centripetal limits plus each segment's own speed cap,
    /// starting at `start_speed_ips` and ending at rest.
    pub fn from_path(
        path: &Path,
        params: &Params,
        start_speed_ips: f64,
        reversed: bool,
    ) -> Result<Self, TrajError> {
        let samples = path.sample(params.max_dx_in);

        let constraints = ConstraintSet::new()
            .with(MaxAcceleration {
                max_accel_ips2: params.max_accel_ips2,
            })
            .with(VelocityLimit {
                max_vel_ips: params.max_vel_ips,
            })
            .with(CentripetalAcceleration {
                max_centripetal_accel_ips2: params.max_centripetal_accel_ips2,
            })
            .with(path.speed_limits());

        let profile = generate_profile(
            &constraints,
            &ProfileGoal {
                pos: path.length(),
                end_vel: 0.0,
            },
            &MotionState::new(0.0, 0.0, start_speed_ips.abs(), 0.0),
            &samples,
        );

        // Every sample and every profile knot becomes a state, so the
        // acceleration is constant between consecutive states
        let mut distances: Vec<f64> = samples
            .iter()
            .map(|s| s.distance)
            .chain(profile.knots().iter().map(|k| k.pos))
            .filter(|d| *d <= profile.end_pos() + PROFILE_EPSILON)
            .collect();
        distances.sort_by(|a, b| a.total_cmp(b));
        distances.dedup_by(|a, b| (*a - *b).abs() < PROFILE_EPSILON);

        let direction = if reversed { -1.0 } else { 1.0 };
        let states: Vec<TimedState> = distances
            .iter()
            .filter_map(|d| {
                let m = profile.first_state_by_pos(*d)?;
                let state = path.state_at(*d);
                Some(TimedState::new(
                    if reversed { state.reversed() } else { state },
                    m.t,
                    direction * m.vel,
                    direction * m.acc,
                ))
            })
            .collect();

        let traj = Self::new(states, path.markers(), reversed)?;

        info!(
            "Built {}trajectory: {} states, {:.3} in, {:.3} s",
            if reversed { "reversed " } else { "" },
            traj.len(),
            traj.total_distance(),
            traj.duration()
        );

        Ok(traj)
    }

    pub fn states(&self) -> &[TimedState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> &TimedState {
        &self.states[0]
    }

    pub fn last(&self) -> &TimedState {
        &self.states[self.states.len() - 1]
    }

    pub fn start_time(&self) -> f64 {
        self.first().t
    }

    pub fn end_time(&self) -> f64 {
        self.last().t
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    pub fn total_distance(&self) -> f64 {
        self.last().state.distance - self.first().state.distance
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// The state at time `t`, clamped to the first and last states.
    pub fn sample(&self, t: f64) -> TimedState {
        if t <= self.start_time() {
            return *self.first();
        }
        if t >= self.end_time() {
            return *self.last();
        }

        let idx = self.states.partition_point(|s| s.t <= t);
        self.interpolate_at(idx - 1, t)
    }

    /// The state at `distance` along the path, clamped to the trajectory.
    pub fn sample_by_distance(&self, distance: f64) -> TimedState {
        let first = self.first();
        let last = self.last();
        if distance <= first.state.distance {
            return *first;
        }
        if distance >= last.state.distance {
            return *last;
        }

        let idx = self
            .states
            .partition_point(|s| s.state.distance <= distance)
            .saturating_sub(1);
        let a = &self.states[idx];

        // Speed along the path is always positive, whichever way the robot
        // faces
        let along = MotionState::new(
            a.t,
            a.state.distance,
            a.velocity.abs(),
            if self.reversed {
                -a.acceleration
            } else {
                a.acceleration
            },
        );

        let t = match (along.next_time_at_pos(distance), self.states.get(idx + 1)) {
            (Some(t), Some(b)) => t.min(b.t),
            (Some(t), None) => t,
            (None, Some(b)) => {
                let frac = (distance - a.state.distance) / (b.state.distance - a.state.distance);
                a.t + limit(frac, 0.0, 1.0) * (b.t - a.t)
            }
            (None, None) => a.t,
        };

        self.sample(t)
    }

    /// A cursor over this trajectory.
    pub fn iter(self: &Arc<Self>) -> TrajectoryIterator {
        TrajectoryIterator::new(Arc::clone(self))
    }

    /// Interpolate between state `idx` and the one after it at time `t`.
    pub(crate) fn interpolate_at(&self, idx: usize, t: f64) -> TimedState {
        match self.states.get(idx + 1) {
            Some(b) => {
                let a = &self.states[idx];
                a.interpolate(b, (t - a.t) / (b.t - a.t))
            }
            None => *self.last(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::{PathState, Pose2d, Translation2d};
    use crate::path::{PathBuilder, Waypoint};
    use approx::assert_relative_eq;

    pub(crate) fn params(max_vel_ips: f64, max_accel_ips2: f64) -> Params {
        Params {
            max_vel_ips,
            max_accel_ips2,
            max_centripetal_accel_ips2: 100.0,
            max_dx_in: 2.0,
        }
    }

    fn straight_100() -> Arc<Trajectory> {
        PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(100.0, 0.0, 0.0, 0.0))
            .build_trajectory(&params(10.0, 5.0))
            .unwrap()
    }

    #[test]
    fn test_straight_timing() {
        let traj = straight_100();

        // 2 s up to 10 in/s over 10 in, 8 s cruise, 2 s down
        assert_relative_eq!(traj.duration(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(traj.total_distance(), 100.0, epsilon = 1e-9);
        assert!(!traj.is_reversed());

        let s = traj.sample(1.0);
        assert_relative_eq!(s.velocity, 5.0, epsilon = 1e-9);
        assert_relative_eq!(s.state.pose.translation.x(), 2.5, epsilon = 1e-9);
        assert_relative_eq!(s.acceleration, 5.0);

        let s = traj.sample(6.0);
        assert_relative_eq!(s.velocity, 10.0, epsilon = 1e-9);
        assert_relative_eq!(s.state.pose.translation.x(), 50.0, epsilon = 1e-9);

        let s = traj.sample(11.0);
        assert_relative_eq!(s.velocity, 5.0, epsilon = 1e-9);
        assert_relative_eq!(s.state.pose.translation.x(), 97.5, epsilon = 1e-9);

        assert_eq!(traj.last().acceleration, 0.0);
        assert_eq!(traj.last().velocity, 0.0);
    }

    #[test]
    fn test_sampling_is_idempotent_and_clamped() {
        let traj = straight_100();

        for t in [0.3, 4.44, 9.999].iter() {
            assert_eq!(traj.sample(*t), traj.sample(*t));
        }
        assert_eq!(traj.sample(0.0), *traj.first());
        assert_eq!(traj.sample(-5.0), *traj.first());
        assert_eq!(traj.sample(100.0), *traj.last());
    }

    #[test]
    fn test_sample_by_distance() {
        let traj = straight_100();

        let s = traj.sample_by_distance(2.5);
        assert_relative_eq!(s.t, 1.0, epsilon = 1e-9);
        let s = traj.sample_by_distance(50.0);
        assert_relative_eq!(s.t, 6.0, epsilon = 1e-9);
        assert_eq!(traj.sample_by_distance(200.0), *traj.last());
    }

    #[test]
    fn test_curved_path_respects_limits() {
        let p = params(80.0, 60.0);
        let traj = PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(100.0, 0.0, 0.0, 25.0))
            .waypoint(Waypoint::new(100.0, 100.0, 40.0, 0.0).with_marker("end"))
            .build_trajectory(&p)
            .unwrap();

        // Centripetal limit on a 25 in radius: sqrt(100 * 25) = 50
        for s in traj.states() {
            assert!(s.velocity <= 80.0 + 1e-6);
            assert!(s.acceleration.abs() <= 60.0 + 1e-6);
            if s.state.curvature.abs() > 0.0 {
                assert!(s.velocity <= 50.0 + 1e-6, "{:?}", s);
            }
            // The last segment is capped at 40
            if s.state.distance > 100.0 - 25.0 + 25.0 * std::f64::consts::PI / 2.0 + 1e-6 {
                assert!(s.velocity <= 40.0 + 1e-6);
            }
        }

        assert_eq!(traj.markers().len(), 1);
        assert_relative_eq!(traj.markers()[0].distance_in, traj.total_distance(), epsilon = 1e-9);

        let end = traj.last().state.pose;
        assert!(end.translation.epsilon_eq(&Translation2d::new(100.0, 100.0), 1e-9));
    }

    #[test]
    fn test_reversed() {
        let traj = PathBuilder::new()
            .reversed(true)
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(-100.0, 0.0, 0.0, 0.0))
            .build_trajectory(&params(10.0, 5.0))
            .unwrap();

        // Path heads along -x, so the robot faces +x while driving it
        let s = traj.sample(6.0);
        assert_relative_eq!(s.velocity, -10.0, epsilon = 1e-9);
        assert_relative_eq!(s.state.pose.translation.x(), -50.0, epsilon = 1e-9);
        assert_relative_eq!(s.state.pose.heading(), 0.0, epsilon = 1e-9);

        let s = traj.sample(1.0);
        assert_relative_eq!(s.state.pose.translation.x(), -2.5, epsilon = 1e-9);
        assert_relative_eq!(traj.sample_by_distance(2.5).t, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_validation() {
        let s = |t: f64, d: f64| {
            TimedState::new(
                PathState::new(Pose2d::from_xy_heading(d, 0.0, 0.0), 0.0, d),
                t,
                1.0,
                0.0,
            )
        };

        assert!(matches!(
            Trajectory::new(vec![], vec![], false),
            Err(TrajError::Empty)
        ));
        assert!(matches!(
            Trajectory::new(vec![s(0.0, 0.0), s(0.0, 1.0)], vec![], false),
            Err(TrajError::NonMonotonicTime { index: 1 })
        ));
        assert!(matches!(
            Trajectory::new(vec![s(0.0, 1.0), s(1.0, 0.0)], vec![], false),
            Err(TrajError::NonMonotonicDistance { index: 1 })
        ));

        // A single state trajectory is valid and samples to itself
        let single = Trajectory::new(vec![s(0.0, 0.0)], vec![], false).unwrap();
        assert_eq!(single.sample(3.0), s(0.0, 0.0));
        assert_eq!(single.duration(), 0.0);
    }
}
