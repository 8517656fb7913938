//! Path authoring from waypoints
//!
//! Consecutive waypoints are joined by lines. An interior waypoint with a
//! non-zero radius has its corner rounded by an arc tangent to both lines, so
//! the robot passes inside the waypoint rather than through it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;
use std::sync::Arc;

use log::debug;

use super::{params::Params, Path, PathError, PathSegment, SegmentSpeed};
use crate::geom::{Translation2d, GEOM_EPSILON};
use crate::profile::MotionState;
use crate::traj::{TrajError, Trajectory};
use drive_if::PathSpec;
use util::maths::sign;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A waypoint to drive through.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub position: Translation2d,

    /// Speed cap for the segments arriving at this waypoint. Zero or less uses
    /// the global maximum velocity.
    pub speed_ips: f64,

    /// Corner radius. Must be positive unless the path goes straight through
    /// the waypoint. Ignored on the first and last waypoints.
    pub radius_in: f64,

    /// Marker reported when the robot reaches this waypoint.
    pub marker: Option<String>,
}

/// Builds paths and trajectories from waypoints.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    waypoints: Vec<Waypoint>,
    start_speed_ips: f64,
    reversed: bool,
}

/// A rounded corner.
#[derive(Debug, Copy, Clone)]
struct Fillet {
    tangent_in: f64,
    arc_start: Translation2d,
    arc_end: Translation2d,
    center: Translation2d,
}

/// Segment geometry before profiles are attached.
#[derive(Debug, Clone)]
struct Piece {
    start: Translation2d,
    end: Translation2d,
    center: Option<Translation2d>,
    speed_ips: f64,
    marker: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x: f64, y: f64, speed_ips: f64, radius_in: f64) -> Self {
        Self {
            position: Translation2d::new(x, y),
            speed_ips,
            radius_in,
            marker: None,
        }
    }

    pub fn with_marker<S: Into<String>>(mut self, name: S) -> Self {
        self.marker = Some(name.into());
        self
    }
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a path authoring file.
    pub fn from_spec(spec: &PathSpec) -> Self {
        let mut builder = Self::new()
            .start_speed(spec.start_speed_ips)
            .reversed(spec.reversed);

        for w in &spec.waypoints {
            let mut wp = Waypoint::new(w.x_in, w.y_in, w.speed_ips, w.radius_in);
            wp.marker = w.marker.clone();
            builder = builder.waypoint(wp);
        }

        builder
    }

    pub fn waypoint(mut self, waypoint: Waypoint) -> Self {
        self.waypoints.push(waypoint);
        self
    }

    pub fn start_speed(mut self, start_speed_ips: f64) -> Self {
        self.start_speed_ips = start_speed_ips.abs();
        self
    }

    /// Drive the path backwards.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Build the geometric path.
    pub fn build_path(&self, params: &Params) -> Result<Path, PathError> {
        let pieces = self.pieces(params)?;
        let last = pieces.len().saturating_sub(1);

        let mut segments = Vec::with_capacity(pieces.len());
        let mut start_speed_ips = self.start_speed_ips;

        for (k, piece) in pieces.iter().enumerate() {
            let end_speed_ips = pieces
                .get(k + 1)
                .map(|p| p.speed_ips.min(piece.speed_ips))
                .unwrap_or(0.0);

            let speed = SegmentSpeed {
                max_speed_ips: piece.speed_ips,
                start: MotionState::new(0.0, 0.0, start_speed_ips.min(piece.speed_ips), 0.0),
                end_speed_ips,
                max_accel_ips2: params.max_accel_ips2,
            };

            let mut seg = match piece.center {
                Some(c) => PathSegment::arc(piece.start, piece.end, c, speed)?,
                None => PathSegment::line(piece.start, piece.end, speed)?,
            };
            if let Some(m) = &piece.marker {
                seg = seg.with_marker(m.clone());
            }
            seg = seg.with_extrapolation(k == last);

            start_speed_ips = seg.end_state().map(|s| s.vel).unwrap_or(0.0);
            segments.push(seg);
        }

        Path::new(segments)
    }

    /// Build the path and time-parameterise it.
    pub fn build_trajectory(&self, params: &Params) -> Result<Arc<Trajectory>, TrajError> {
        let path = self.build_path(params)?;
        let traj = Trajectory::from_path(&path, params, self.start_speed_ips, self.reversed)?;
        Ok(Arc::new(traj))
    }

    /// Split the waypoints into line and arc pieces.
    fn pieces(&self, params: &Params) -> Result<Vec<Piece>, PathError> {
        let n = self.waypoints.len();
        if n < 2 {
            return Err(PathError::TooFewWaypoints(n));
        }

        for w in self.waypoints.windows(2) {
            if w[0].position.distance(&w[1].position) < GEOM_EPSILON {
                return Err(PathError::ZeroLengthSegment(w[0].position, w[1].position));
            }
        }

        // ---- CORNERS ----

        let mut fillets: Vec<Option<Fillet>> = vec![None; n];
        for i in 1..n - 1 {
            fillets[i] = self.fillet(i)?;
        }

        // Each leg has to fit the tangent lengths of the corners at both ends
        for i in 0..n - 1 {
            let leg_in = self.waypoints[i]
                .position
                .distance(&self.waypoints[i + 1].position);
            let used_in = fillets[i].map(|f| f.tangent_in).unwrap_or(0.0)
                + fillets[i + 1].map(|f| f.tangent_in).unwrap_or(0.0);

            if used_in > leg_in + GEOM_EPSILON {
                let index = if fillets[i + 1].is_some() { i + 1 } else { i };
                return Err(PathError::FilletTooLarge {
                    index,
                    radius_in: self.waypoints[index].radius_in,
                });
            }
        }

        // ---- PIECES ----

        let mut pieces: Vec<Piece> = Vec::new();
        let mut cursor = self.waypoints[0].position;

        for i in 1..n {
            let wp = &self.waypoints[i];
            let speed_ips = if wp.speed_ips > 0.0 {
                wp.speed_ips.min(params.max_vel_ips)
            } else {
                params.max_vel_ips
            };

            let (line_end, arc) = match fillets[i] {
                Some(f) => (f.arc_start, Some(f)),
                None => (wp.position, None),
            };

            // A leg fully used by corners has no straight part left
            if cursor.distance(&line_end) > GEOM_EPSILON {
                pieces.push(Piece {
                    start: cursor,
                    end: line_end,
                    center: None,
                    speed_ips,
                    marker: None,
                });
            }
            cursor = line_end;

            if let Some(f) = arc {
                pieces.push(Piece {
                    start: f.arc_start,
                    end: f.arc_end,
                    center: Some(f.center),
                    speed_ips,
                    marker: None,
                });
                cursor = f.arc_end;
            }

            if let (Some(m), Some(p)) = (&wp.marker, pieces.last_mut()) {
                p.marker = Some(m.clone());
            }
        }

        debug!(
            "Split {} waypoints into {} path segments",
            n,
            pieces.len()
        );

        Ok(pieces)
    }

    /// The rounded corner at interior waypoint `i`, if it has one.
    fn fillet(&self, i: usize) -> Result<Option<Fillet>, PathError> {
        let wp = &self.waypoints[i];
        let prev = self.waypoints[i - 1].position;
        let next = self.waypoints[i + 1].position;
        let dir_in = wp.position - prev;
        let dir_out = next - wp.position;

        let turn_rad = dir_in.direction().distance(&dir_out.direction());

        // Straight through, nothing to round
        if turn_rad.abs() < GEOM_EPSILON {
            return Ok(None);
        }

        // The heading can't jump, a turn needs an arc to follow
        if wp.radius_in <= 0.0 {
            return Err(PathError::SharpCorner { index: i });
        }

        // Doubling back can't be rounded by a single arc
        if PI - turn_rad.abs() < GEOM_EPSILON {
            return Err(PathError::FilletTooLarge {
                index: i,
                radius_in: wp.radius_in,
            });
        }

        let tangent_in = wp.radius_in * (turn_rad.abs() / 2.0).tan();
        let u_in = dir_in.scale(1.0 / dir_in.norm());
        let u_out = dir_out.scale(1.0 / dir_out.norm());

        let arc_start = wp.position - u_in.scale(tangent_in);
        let arc_end = wp.position + u_out.scale(tangent_in);
        let left_normal = Translation2d::new(-u_in.y(), u_in.x());
        let center = arc_start + left_normal.scale(wp.radius_in * sign(turn_rad));

        Ok(Some(Fillet {
            tangent_in,
            arc_start,
            arc_end,
            center,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use drive_if::WaypointSpec;

    fn params() -> Params {
        Params {
            max_vel_ips: 60.0,
            max_accel_ips2: 50.0,
            max_centripetal_accel_ips2: 100.0,
            max_dx_in: 2.0,
        }
    }

    #[test]
    fn test_fillet_corner() {
        let path = PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(100.0, 0.0, 40.0, 20.0).with_marker("corner"))
            .waypoint(Waypoint::new(100.0, 100.0, 30.0, 0.0).with_marker("end"))
            .build_path(&params())
            .unwrap();

        let segs = path.segments();
        assert_eq!(segs.len(), 3);
        assert!(!segs[0].is_arc());
        assert!(segs[1].is_arc());
        assert!(!segs[2].is_arc());

        // Left turn of 90 degrees, radius 20
        assert_relative_eq!(segs[0].end().x(), 80.0, epsilon = 1e-9);
        assert_relative_eq!(segs[1].curvature(), 1.0 / 20.0, epsilon = 1e-12);
        assert_relative_eq!(segs[1].center().unwrap().y(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(segs[2].start().y(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(
            path.length(),
            80.0 + 20.0 * PI / 2.0 + 80.0,
            epsilon = 1e-9
        );

        assert_eq!(segs[1].marker(), Some("corner"));
        assert_eq!(segs[2].marker(), Some("end"));
        assert!(segs[2].extrapolates());
        assert!(!segs[0].extrapolates());

        assert_eq!(segs[0].max_speed(), 40.0);
        assert_eq!(segs[2].max_speed(), 30.0);

        // Profiles are chained: the line hands over at the arc's speed
        assert_relative_eq!(segs[0].end_state().unwrap().vel, 40.0, epsilon = 1e-9);
        assert_relative_eq!(segs[1].start_state().unwrap().vel, 40.0, epsilon = 1e-9);
        assert_relative_eq!(segs[1].end_state().unwrap().vel, 30.0, epsilon = 1e-9);
        assert_eq!(segs[2].end_state().unwrap().vel, 0.0);
    }

    #[test]
    fn test_sharp_corner_and_default_speed() {
        // Radius zero is fine when the path goes straight through
        let path = PathBuilder::new()
            .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(10.0, 0.0, 0.0, 0.0))
            .waypoint(Waypoint::new(30.0, 0.0, 500.0, 0.0))
            .build_path(&params())
            .unwrap();

        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.segments()[0].max_speed(), 60.0);
        assert_eq!(path.segments()[1].max_speed(), 60.0);
        assert_relative_eq!(path.length(), 30.0, epsilon = 1e-9);

        // A turn without a radius would make the heading jump
        assert!(matches!(
            PathBuilder::new()
                .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
                .waypoint(Waypoint::new(10.0, 0.0, 0.0, 0.0))
                .waypoint(Waypoint::new(10.0, -10.0, 500.0, 0.0))
                .build_path(&params()),
            Err(PathError::SharpCorner { index: 1 })
        ));

        // Doubling back too
        assert!(matches!(
            PathBuilder::new()
                .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
                .waypoint(Waypoint::new(20.0, 0.0, 0.0, 0.0))
                .waypoint(Waypoint::new(30.0, 0.0, 0.0, 0.0))
                .waypoint(Waypoint::new(10.0, 0.0, 0.0, 0.0))
                .build_trajectory(&params()),
            Err(TrajError::Path(PathError::SharpCorner { index: 2 }))
        ));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            PathBuilder::new()
                .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
                .build_path(&params()),
            Err(PathError::TooFewWaypoints(1))
        ));

        assert!(matches!(
            PathBuilder::new()
                .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
                .waypoint(Waypoint::new(0.0, 0.0, 10.0, 0.0))
                .build_path(&params()),
            Err(PathError::ZeroLengthSegment(_, _))
        ));

        // A 90 degree corner of radius 20 needs 20 in each side
        assert!(matches!(
            PathBuilder::new()
                .waypoint(Waypoint::new(0.0, 0.0, 0.0, 0.0))
                .waypoint(Waypoint::new(10.0, 0.0, 40.0, 20.0))
                .waypoint(Waypoint::new(10.0, 100.0, 40.0, 0.0))
                .build_path(&params()),
            Err(PathError::FilletTooLarge { index: 1, .. })
        ));
    }

    #[test]
    fn test_from_spec() {
        let spec = PathSpec {
            reversed: true,
            start_speed_ips: 0.0,
            waypoints: vec![
                WaypointSpec::new(0.0, 0.0, 0.0, 0.0),
                WaypointSpec::new(-50.0, 0.0, 30.0, 0.0),
            ],
        };

        let builder = PathBuilder::from_spec(&spec);
        assert_eq!(builder.waypoints().len(), 2);

        let traj = builder.build_trajectory(&params()).unwrap();
        assert!(traj.is_reversed());
        assert_relative_eq!(traj.total_distance(), 50.0, epsilon = 1e-9);
        assert!(traj.last().velocity == 0.0);
    }
}
