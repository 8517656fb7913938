//! # Path
//!
//! A path is a continuous chain of line and arc segments. Each segment carries
//! its own speed cap and a motion profile over its own length, and optionally a
//! named marker which is reported when the robot passes the segment's end.
//!
//! Paths are authored as waypoints through the [`PathBuilder`], which rounds
//! corners with tangent arcs.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod builder;
pub mod params;
mod segment;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

use crate::geom::{PathState, Translation2d};
use crate::profile::SegmentSpeedLimit;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use builder::{PathBuilder, Waypoint};
pub use params::Params;
pub use segment::{PathSegment, SegmentSpeed};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum gap allowed between the end of one segment and the start of the
/// next.
pub const CONTINUITY_TOLERANCE_IN: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A continuous chain of segments.
#[derive(Debug, Clone, Serialize)]
pub struct Path {
    segments: Vec<PathSegment>,

    /// Distance from the start of the path to the start of each segment
    offsets: Vec<f64>,
}

/// A named point along a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub name: String,

    /// Distance from the start of the path in inches.
    pub distance_in: f64,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Segment from {0:?} to {1:?} has zero length")]
    ZeroLengthSegment(Translation2d, Translation2d),

    #[error("Arc center {center:?} is not equidistant from {start:?} and {end:?}")]
    InconsistentArcCenter {
        start: Translation2d,
        end: Translation2d,
        center: Translation2d,
    },

    #[error("Arc from {0:?} to {1:?} is a semicircle, its direction is ambiguous")]
    AmbiguousArc(Translation2d, Translation2d),

    #[error("A path needs at least two waypoints, found {0}")]
    TooFewWaypoints(usize),

    #[error("The corner radius at waypoint {index} ({radius_in} in) does not fit between its neighbours")]
    FilletTooLarge { index: usize, radius_in: f64 },

    #[error("Waypoint {index} turns without a corner radius")]
    SharpCorner { index: usize },

    #[error("A path must contain at least one segment")]
    EmptyPath,

    #[error("Segment {index} starts {gap_in} in away from the end of the previous segment")]
    Discontinuous { index: usize, gap_in: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a path from a chain of segments.
    ///
    /// Each segment must start where the previous one ends.
    pub fn new(segments: Vec<PathSegment>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::EmptyPath);
        }

        let mut offsets = Vec::with_capacity(segments.len());
        let mut offset = 0.0;

        for (i, seg) in segments.iter().enumerate() {
            if i > 0 {
                let gap_in = segments[i - 1].end().distance(&seg.start());
                if gap_in > CONTINUITY_TOLERANCE_IN {
                    return Err(PathError::Discontinuous { index: i, gap_in });
                }
            }
            offsets.push(offset);
            offset += seg.length();
        }

        debug!(
            "Built path of {} segments, {:.3} in long",
            segments.len(),
            offset
        );

        Ok(Self { segments, offsets })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn length(&self) -> f64 {
        match (self.offsets.last(), self.segments.last()) {
            (Some(o), Some(s)) => o + s.length(),
            _ => 0.0,
        }
    }

    /// The path state at `distance` from the start, clamped to the path.
    pub fn state_at(&self, distance: f64) -> PathState {
        let distance = distance.max(0.0).min(self.length());

        // Last segment starting at or before the distance
        let idx = self
            .offsets
            .partition_point(|o| *o <= distance)
            .saturating_sub(1);

        self.segments[idx].path_state_at(distance - self.offsets[idx], self.offsets[idx])
    }

    /// Sample the path at most `max_dx_in` apart. Segment boundaries are always
    /// sampled, with the boundary state taken from the segment that starts
    /// there.
    pub fn sample(&self, max_dx_in: f64) -> Vec<PathState> {
        let max_dx_in = if max_dx_in > 0.0 {
            max_dx_in
        } else {
            std::f64::INFINITY
        };

        let mut states = Vec::new();

        for (seg, offset) in self.segments.iter().zip(self.offsets.iter()) {
            let n = (seg.length() / max_dx_in).ceil().max(1.0) as usize;
            for k in 0..n {
                let d = seg.length() * k as f64 / n as f64;
                states.push(seg.path_state_at(d, *offset));
            }
        }

        if let (Some(seg), Some(offset)) = (self.segments.last(), self.offsets.last()) {
            states.push(seg.path_state_at(seg.length(), *offset));
        }

        states
    }

    /// Markers along the path, at the end distance of their segments.
    pub fn markers(&self) -> Vec<Marker> {
        self.segments
            .iter()
            .zip(self.offsets.iter())
            .filter_map(|(seg, offset)| {
                seg.marker().map(|name| Marker {
                    name: name.to_string(),
                    distance_in: offset + seg.length(),
                })
            })
            .collect()
    }

    /// Each segment's speed cap as a constraint over its distance range.
    pub fn speed_limits(&self) -> SegmentSpeedLimit {
        let mut limit = SegmentSpeedLimit::new();
        for (seg, offset) in self.segments.iter().zip(self.offsets.iter()) {
            limit.push(offset + seg.length(), seg.max_speed());
        }
        limit
    }

    /// Distance along the path of the point on the path nearest to `point`.
    pub fn closest_distance(&self, point: &Translation2d) -> f64 {
        self.segments
            .iter()
            .zip(self.offsets.iter())
            .map(|(seg, offset)| {
                let closest = seg.closest_point(point);
                (
                    closest.distance(point),
                    offset + seg.distance_travelled(&closest),
                )
            })
            .fold((std::f64::INFINITY, 0.0), |best, c| if c.0 < best.0 { c } else { best })
            .1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::profile::{MotionState, TimingConstraint};
    use approx::assert_relative_eq;

    fn speed(max_speed_ips: f64) -> SegmentSpeed {
        SegmentSpeed {
            max_speed_ips,
            start: MotionState::default(),
            end_speed_ips: 0.0,
            max_accel_ips2: 50.0,
        }
    }

    fn l_path() -> Path {
        let a = Translation2d::new(0.0, 0.0);
        let b = Translation2d::new(10.0, 0.0);
        let c = Translation2d::new(20.0, 10.0);
        let center = Translation2d::new(10.0, 10.0);
        Path::new(vec![
            PathSegment::line(a, b, speed(30.0)).unwrap(),
            PathSegment::arc(b, c, center, speed(20.0))
                .unwrap()
                .with_marker("arc_end"),
        ])
        .unwrap()
    }

    #[test]
    fn test_path_queries() {
        let path = l_path();
        let arc_len = 10.0 * std::f64::consts::PI / 2.0;

        assert_relative_eq!(path.length(), 10.0 + arc_len);

        let s = path.state_at(5.0);
        assert_relative_eq!(s.pose.translation.x(), 5.0);
        assert_eq!(s.curvature, 0.0);

        let s = path.state_at(10.0 + arc_len);
        assert_relative_eq!(s.pose.translation.x(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(s.pose.translation.y(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(s.pose.heading(), std::f64::consts::PI / 2.0, epsilon = 1e-9);
        assert_relative_eq!(s.curvature, 0.1, epsilon = 1e-12);

        // Clamped
        assert_eq!(path.state_at(-3.0), path.state_at(0.0));

        let markers = path.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "arc_end");
        assert_relative_eq!(markers[0].distance_in, path.length());

        let limits = path.speed_limits();
        assert_eq!(limits.max_velocity(&path.state_at(1.0)), 30.0);
        assert_eq!(limits.max_velocity(&path.state_at(11.0)), 20.0);

        assert_relative_eq!(
            path.closest_distance(&Translation2d::new(4.0, -2.0)),
            4.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_sample() {
        let path = l_path();
        let states = path.sample(1.0);

        // 10 line samples, 16 arc samples and the end
        assert_eq!(states.len(), 10 + 16 + 1);
        for w in states.windows(2) {
            assert!(w[1].distance > w[0].distance);
            assert!(w[1].distance - w[0].distance <= 1.0 + 1e-9);
        }

        // Boundary state comes from the arc
        assert_relative_eq!(states[10].distance, 10.0);
        assert_relative_eq!(states[10].curvature, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_discontinuity_rejected() {
        let a = PathSegment::line(
            Translation2d::new(0.0, 0.0),
            Translation2d::new(1.0, 0.0),
            speed(10.0),
        )
        .unwrap();
        let b = PathSegment::line(
            Translation2d::new(1.5, 0.0),
            Translation2d::new(3.0, 0.0),
            speed(10.0),
        )
        .unwrap();

        match Path::new(vec![a, b]) {
            Err(PathError::Discontinuous { index, gap_in }) => {
                assert_eq!(index, 1);
                assert_relative_eq!(gap_in, 0.5);
            }
            r => panic!("Expected discontinuity, got {:?}", r.map(|p| p.length())),
        }
        assert!(matches!(Path::new(vec![]), Err(PathError::EmptyPath)));
    }
}
