//! Line and arc path segments

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::Serialize;

use super::PathError;
use crate::geom::{PathState, Pose2d, Rotation2d, Translation2d, GEOM_EPSILON};
use crate::profile::{
    generate_profile, ConstraintSet, MaxAcceleration, MotionProfile, MotionState, ProfileGoal,
    VelocityLimit,
};
use util::maths::{limit, sign};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Relative tolerance on the start and end radii of an arc.
const ARC_RADIUS_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The speed requirements a segment's profile is generated from.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SegmentSpeed {
    /// Speed cap over the whole segment
    pub max_speed_ips: f64,

    /// Kinematic state at the start of the segment. Only the velocity is used,
    /// the profile is always generated from zero distance.
    pub start: MotionState,

    /// Desired speed at the end of the segment
    pub end_speed_ips: f64,

    /// Acceleration limit
    pub max_accel_ips2: f64,
}

/// A line or arc piece of a path.
///
/// Segments are immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct PathSegment {
    start: Translation2d,
    end: Translation2d,

    /// Arc center, `None` for lines
    center: Option<Translation2d>,

    max_speed_ips: f64,
    marker: Option<String>,

    /// Allow `point_by_distance` past the end of the segment
    extrapolate: bool,

    length_in: f64,

    /// Signed angle swept by an arc, counter-clockwise positive. Zero for
    /// lines.
    sweep_rad: f64,

    profile: MotionProfile,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSegment {
    /// Create a straight segment.
    pub fn line(
        start: Translation2d,
        end: Translation2d,
        speed: SegmentSpeed,
    ) -> Result<Self, PathError> {
        let length_in = start.distance(&end);
        if length_in < GEOM_EPSILON {
            return Err(PathError::ZeroLengthSegment(start, end));
        }

        Ok(Self::build(start, end, None, length_in, 0.0, speed))
    }

    /// Create an arc about `center`, taking the shorter way round from
    /// `start` to `end`.
    pub fn arc(
        start: Translation2d,
        end: Translation2d,
        center: Translation2d,
        speed: SegmentSpeed,
    ) -> Result<Self, PathError> {
        if start.distance(&end) < GEOM_EPSILON {
            return Err(PathError::ZeroLengthSegment(start, end));
        }

        let start_radial = start - center;
        let end_radial = end - center;
        let radius = start_radial.norm();

        if radius < GEOM_EPSILON
            || (radius - end_radial.norm()).abs() > ARC_RADIUS_TOLERANCE * radius.max(1.0)
        {
            return Err(PathError::InconsistentArcCenter { start, end, center });
        }

        let cross = start_radial.cross(&end_radial);
        let dot = start_radial.dot(&end_radial);
        if cross.abs() < GEOM_EPSILON * radius * radius && dot < 0.0 {
            return Err(PathError::AmbiguousArc(start, end));
        }

        let sweep_rad = cross.atan2(dot);
        let length_in = radius * sweep_rad.abs();

        Ok(Self::build(start, end, Some(center), length_in, sweep_rad, speed))
    }

    fn build(
        start: Translation2d,
        end: Translation2d,
        center: Option<Translation2d>,
        length_in: f64,
        sweep_rad: f64,
        speed: SegmentSpeed,
    ) -> Self {
        let constraints = ConstraintSet::new()
            .with(MaxAcceleration {
                max_accel_ips2: speed.max_accel_ips2,
            })
            .with(VelocityLimit {
                max_vel_ips: speed.max_speed_ips,
            });

        let profile = generate_profile(
            &constraints,
            &ProfileGoal {
                pos: length_in,
                end_vel: speed.end_speed_ips,
            },
            &MotionState::new(speed.start.t, 0.0, speed.start.vel, 0.0),
            &[],
        );

        Self {
            start,
            end,
            center,
            max_speed_ips: speed.max_speed_ips.abs(),
            marker: None,
            extrapolate: false,
            length_in,
            sweep_rad,
            profile,
        }
    }

    /// Attach a named marker to the end of this segment.
    pub fn with_marker<S: Into<String>>(mut self, name: S) -> Self {
        self.marker = Some(name.into());
        self
    }

    /// Allow distance queries past the end of this segment to extrapolate.
    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.extrapolate = extrapolate;
        self
    }

    pub fn start(&self) -> Translation2d {
        self.start
    }

    pub fn end(&self) -> Translation2d {
        self.end
    }

    pub fn center(&self) -> Option<Translation2d> {
        self.center
    }

    pub fn is_arc(&self) -> bool {
        self.center.is_some()
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed_ips
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn extrapolates(&self) -> bool {
        self.extrapolate
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn start_state(&self) -> Option<MotionState> {
        self.profile.start_state()
    }

    pub fn end_state(&self) -> Option<MotionState> {
        self.profile.end_state()
    }

    /// Arc length of the segment.
    pub fn length(&self) -> f64 {
        self.length_in
    }

    /// Curvature, positive for a left turn.
    pub fn curvature(&self) -> f64 {
        match self.center {
            Some(c) => sign(self.sweep_rad) / self.start.distance(&c),
            None => 0.0,
        }
    }

    /// The point on the segment nearest to `point`.
    pub fn closest_point(&self, point: &Translation2d) -> Translation2d {
        match self.center {
            None => {
                let direction = (self.end - self.start).scale(1.0 / self.length_in);
                let along = limit(
                    (*point - self.start).dot(&direction),
                    0.0,
                    self.length_in,
                );
                self.start + direction.scale(along)
            }
            Some(center) => {
                let radial = *point - center;
                let radius = self.start.distance(&center);
                if radial.norm() < GEOM_EPSILON {
                    return self.start;
                }

                // The projection is on the arc if it lies inside the wedge
                // swept from the start radial to the end radial
                let s = sign(self.sweep_rad);
                let start_radial = self.start - center;
                let end_radial = self.end - center;
                if s * start_radial.cross(&radial) >= 0.0 && s * radial.cross(&end_radial) >= 0.0
                {
                    center + radial.scale(radius / radial.norm())
                } else if point.distance(&self.start) <= point.distance(&self.end) {
                    self.start
                } else {
                    self.end
                }
            }
        }
    }

    /// The point `distance` along the segment from its start.
    ///
    /// Distances are clamped to the segment unless it was built to
    /// extrapolate, in which case distances past the end continue along the
    /// line or around the arc.
    pub fn point_by_distance(&self, distance: f64) -> Translation2d {
        let distance = self.clamp_distance(distance);

        match self.center {
            None => self
                .start
                .extrapolate(&self.end, distance / self.length_in),
            Some(center) => {
                let angle = distance / self.length_in * self.sweep_rad;
                center + (self.start - center).rotate_by(&Rotation2d::from_radians(angle))
            }
        }
    }

    /// Direction of travel `distance` along the segment.
    pub fn heading_at(&self, distance: f64) -> Rotation2d {
        match self.center {
            None => (self.end - self.start).direction(),
            Some(center) => {
                let radial = self.point_by_distance(distance) - center;
                let tangent = if self.sweep_rad >= 0.0 {
                    Translation2d::new(-radial.y(), radial.x())
                } else {
                    Translation2d::new(radial.y(), -radial.x())
                };
                tangent.direction()
            }
        }
    }

    /// The path state `distance` along the segment, with `offset` added to
    /// the distance so that it's measured from the start of the whole path.
    pub fn path_state_at(&self, distance: f64, offset: f64) -> PathState {
        let distance = self.clamp_distance(distance);
        PathState::new(
            Pose2d::new(self.point_by_distance(distance), self.heading_at(distance)),
            self.curvature(),
            offset + distance,
        )
    }

    /// Distance from a point on the segment (normally the result of
    /// `closest_point`) to the segment's end.
    pub fn remaining_distance(&self, point: &Translation2d) -> f64 {
        match self.center {
            None => point.distance(&self.end),
            Some(center) => {
                let angle = Translation2d::angle(&(*point - center), &(self.end - center));
                angle / self.sweep_rad.abs() * self.length_in
            }
        }
    }

    /// Distance from the segment's start to a point on the segment.
    pub fn distance_travelled(&self, point: &Translation2d) -> f64 {
        self.length_in - self.remaining_distance(point)
    }

    /// Profiled speed `distance` along the segment.
    ///
    /// Returns zero and logs a warning if the profile has no state at the
    /// (clamped) distance.
    pub fn speed_by_distance(&self, distance: f64) -> f64 {
        let distance = limit(distance, self.profile.start_pos(), self.profile.end_pos());
        match self.profile.first_state_by_pos(distance) {
            Some(state) => state.vel,
            None => {
                warn!(
                    "No profile state at {:.3} in on segment {:?} -> {:?}, commanding zero speed",
                    distance, self.start, self.end
                );
                0.0
            }
        }
    }

    /// Profiled speed at the point of the segment nearest to `point`.
    pub fn speed_by_closest_point(&self, point: &Translation2d) -> f64 {
        self.speed_by_distance(self.distance_travelled(&self.closest_point(point)))
    }

    fn clamp_distance(&self, distance: f64) -> f64 {
        if self.extrapolate {
            distance.max(0.0)
        } else {
            limit(distance, 0.0, self.length_in)
        }
    }
}
