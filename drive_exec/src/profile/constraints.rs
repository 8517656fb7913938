//! Timing constraints
//!
//! A timing constraint limits the velocity and acceleration allowed at a point
//! on the path. Several constraints combine by taking the tightest velocity
//! ceiling and the intersection of their acceleration bounds.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::fmt::Debug;

use crate::geom::{PathState, GEOM_EPSILON};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A limit on motion along a path.
pub trait TimingConstraint: Debug + Send + Sync {
    /// The highest velocity allowed at the state, may be infinite.
    fn max_velocity(&self, state: &PathState) -> f64;

    /// The allowed accelerations at the state when travelling at `velocity`.
    fn accel_bounds(&self, state: &PathState, velocity: f64) -> AccelBounds;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A range of allowed accelerations.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AccelBounds {
    pub min: f64,
    pub max: f64,
}

/// Symmetric acceleration limit, with no velocity limit.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MaxAcceleration {
    pub max_accel_ips2: f64,
}

/// A constant velocity ceiling.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct VelocityLimit {
    pub max_vel_ips: f64,
}

/// Limits velocity so that the centripetal acceleration `v^2 * curvature`
/// stays within bounds.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct CentripetalAcceleration {
    pub max_centripetal_accel_ips2: f64,
}

/// Piecewise velocity ceilings by distance along the path.
///
/// Each range is given by its end distance, ranges must be given in
/// increasing order. Distances past the last range use the last ceiling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentSpeedLimit {
    ranges: Vec<(f64, f64)>,
}

/// A collection of constraints that acts as a single constraint.
#[derive(Debug, Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn TimingConstraint>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AccelBounds {
    pub const NO_LIMITS: AccelBounds = AccelBounds {
        min: std::f64::NEG_INFINITY,
        max: std::f64::INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn intersect(&self, other: &AccelBounds) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl TimingConstraint for MaxAcceleration {
    fn max_velocity(&self, _state: &PathState) -> f64 {
        std::f64::INFINITY
    }

    fn accel_bounds(&self, _state: &PathState, _velocity: f64) -> AccelBounds {
        AccelBounds::new(-self.max_accel_ips2.abs(), self.max_accel_ips2.abs())
    }
}

impl TimingConstraint for VelocityLimit {
    fn max_velocity(&self, _state: &PathState) -> f64 {
        self.max_vel_ips.abs()
    }

    fn accel_bounds(&self, _state: &PathState, _velocity: f64) -> AccelBounds {
        AccelBounds::NO_LIMITS
    }
}

impl TimingConstraint for CentripetalAcceleration {
    fn max_velocity(&self, state: &PathState) -> f64 {
        if state.curvature.abs() < GEOM_EPSILON {
            return std::f64::INFINITY;
        }
        (self.max_centripetal_accel_ips2 / state.curvature).abs().sqrt()
    }

    fn accel_bounds(&self, _state: &PathState, _velocity: f64) -> AccelBounds {
        AccelBounds::NO_LIMITS
    }
}

impl SegmentSpeedLimit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a range ending at `end_distance` with the given ceiling.
    pub fn push(&mut self, end_distance: f64, max_vel_ips: f64) {
        self.ranges.push((end_distance, max_vel_ips.abs()));
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl TimingConstraint for SegmentSpeedLimit {
    fn max_velocity(&self, state: &PathState) -> f64 {
        self.ranges
            .iter()
            .find(|(end, _)| state.distance < end - GEOM_EPSILON)
            .or_else(|| self.ranges.last())
            .map(|(_, v)| *v)
            .unwrap_or(std::f64::INFINITY)
    }

    fn accel_bounds(&self, _state: &PathState, _velocity: f64) -> AccelBounds {
        AccelBounds::NO_LIMITS
    }
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint, builder style.
    pub fn with<C: TimingConstraint + 'static>(mut self, constraint: C) -> Self {
        self.push(constraint);
        self
    }

    pub fn push<C: TimingConstraint + 'static>(&mut self, constraint: C) {
        self.constraints.push(Box::new(constraint));
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl TimingConstraint for ConstraintSet {
    fn max_velocity(&self, state: &PathState) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.max_velocity(state))
            .fold(std::f64::INFINITY, f64::min)
    }

    fn accel_bounds(&self, state: &PathState, velocity: f64) -> AccelBounds {
        self.constraints
            .iter()
            .map(|c| c.accel_bounds(state, velocity))
            .fold(AccelBounds::NO_LIMITS, |acc, b| acc.intersect(&b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn state(curvature: f64, distance: f64) -> PathState {
        PathState {
            curvature,
            distance,
            ..Default::default()
        }
    }

    #[test]
    fn test_combination() {
        let set = ConstraintSet::new()
            .with(MaxAcceleration { max_accel_ips2: 50.0 })
            .with(VelocityLimit { max_vel_ips: 100.0 })
            .with(CentripetalAcceleration {
                max_centripetal_accel_ips2: 40.0,
            });

        assert_eq!(set.len(), 3);

        // Straight: only the velocity limit applies
        assert_relative_eq!(set.max_velocity(&state(0.0, 0.0)), 100.0);

        // 10 in radius: sqrt(40 * 10) = 20
        assert_relative_eq!(set.max_velocity(&state(-0.1, 0.0)), 20.0, epsilon = 1e-9);

        let b = set.accel_bounds(&state(0.0, 0.0), 10.0);
        assert_eq!(b, AccelBounds::new(-50.0, 50.0));
        assert!(b.is_valid());

        assert_eq!(ConstraintSet::new().max_velocity(&state(0.0, 0.0)), std::f64::INFINITY);
    }

    #[test]
    fn test_segment_speed_limit() {
        let mut limit = SegmentSpeedLimit::new();
        limit.push(10.0, 30.0);
        limit.push(25.0, 60.0);

        assert_eq!(limit.max_velocity(&state(0.0, 0.0)), 30.0);
        assert_eq!(limit.max_velocity(&state(0.0, 10.0)), 60.0);
        assert_eq!(limit.max_velocity(&state(0.0, 40.0)), 60.0);
        assert_eq!(SegmentSpeedLimit::new().max_velocity(&state(0.0, 0.0)), std::f64::INFINITY);
    }
}
