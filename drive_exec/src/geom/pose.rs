//! Rigid body pose and twist

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{Rotation2d, Translation2d, GEOM_EPSILON};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and heading on the field.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2d {
    pub translation: Translation2d,
    pub rotation: Rotation2d,
}

/// A velocity (or a small displacement) in the robot frame.
///
/// `dx` is forwards, `dy` to the left and `dtheta` counter-clockwise.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist2d {
    pub dx: f64,
    pub dy: f64,
    pub dtheta: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Twist2d {
    pub fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn scaled(&self, scale: f64) -> Self {
        Self::new(self.dx * scale, self.dy * scale, self.dtheta * scale)
    }

    /// Length of the translational part.
    pub fn norm(&self) -> f64 {
        // Common case of dy == 0
        if self.dy == 0.0 {
            return self.dx.abs();
        }
        self.dx.hypot(self.dy)
    }

    /// Curvature of the arc this twist follows, zero for a pure rotation.
    pub fn curvature(&self) -> f64 {
        let dn = self.norm();
        if dn < GEOM_EPSILON {
            return 0.0;
        }
        self.dtheta / dn
    }
}

impl Pose2d {
    pub fn new(translation: Translation2d, rotation: Rotation2d) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_xy_heading(x: f64, y: f64, heading_rad: f64) -> Self {
        Self::new(Translation2d::new(x, y), Rotation2d::from_radians(heading_rad))
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_translation(translation: Translation2d) -> Self {
        Self::new(translation, Rotation2d::identity())
    }

    pub fn from_rotation(rotation: Rotation2d) -> Self {
        Self::new(Translation2d::identity(), rotation)
    }

    /// Compose two poses, `other` being expressed in this pose's frame.
    pub fn transform_by(&self, other: &Pose2d) -> Self {
        Self::new(
            self.translation
                .translate_by(&other.translation.rotate_by(&self.rotation)),
            self.rotation.rotate_by(&other.rotation),
        )
    }

    /// The pose which undoes this one.
    pub fn inverse(&self) -> Self {
        let rotation_inverted = self.rotation.inverse();
        Self::new(
            self.translation.inverse().rotate_by(&rotation_inverted),
            rotation_inverted,
        )
    }

    /// Pose reached by following a constant curvature arc described by
    /// `delta` from the origin.
    pub fn exp(delta: &Twist2d) -> Self {
        let sin_theta = delta.dtheta.sin();
        let cos_theta = delta.dtheta.cos();
        let (s, c) = if delta.dtheta.abs() < GEOM_EPSILON {
            (
                1.0 - delta.dtheta * delta.dtheta / 6.0,
                0.5 * delta.dtheta,
            )
        } else {
            (sin_theta / delta.dtheta, (1.0 - cos_theta) / delta.dtheta)
        };

        Self::new(
            Translation2d::new(delta.dx * s - delta.dy * c, delta.dx * c + delta.dy * s),
            Rotation2d::from_vector(cos_theta, sin_theta),
        )
    }

    /// Inverse of [`Pose2d::exp`].
    pub fn log(transform: &Pose2d) -> Twist2d {
        let dtheta = transform.rotation.radians();
        let half_dtheta = 0.5 * dtheta;
        let cos_minus_one = transform.rotation.cos() - 1.0;

        let halftheta_by_tan_of_halfdtheta = if cos_minus_one.abs() < GEOM_EPSILON {
            1.0 - dtheta * dtheta / 12.0
        } else {
            -(half_dtheta * transform.rotation.sin()) / cos_minus_one
        };

        let translation_part = transform.translation.rotate_by(&Rotation2d::from_vector(
            halftheta_by_tan_of_halfdtheta,
            -half_dtheta,
        ));
        let scale = halftheta_by_tan_of_halfdtheta.hypot(half_dtheta);

        Twist2d::new(
            translation_part.x() * scale,
            translation_part.y() * scale,
            dtheta,
        )
    }

    /// Interpolate along the constant curvature arc joining the two poses.
    pub fn interpolate(&self, other: &Pose2d, x: f64) -> Self {
        if x <= 0.0 {
            return *self;
        }
        if x >= 1.0 {
            return *other;
        }
        let twist = Pose2d::log(&self.inverse().transform_by(other));
        self.transform_by(&Pose2d::exp(&twist.scaled(x)))
    }

    /// Arc length of the constant curvature motion joining the two poses.
    pub fn distance(&self, other: &Pose2d) -> f64 {
        Pose2d::log(&self.inverse().transform_by(other)).norm()
    }

    /// The same pose facing the opposite way.
    pub fn mirror(&self) -> Self {
        Self::new(
            self.translation,
            self.rotation.rotate_by(&Rotation2d::from_radians(std::f64::consts::PI)),
        )
    }

    pub fn heading(&self) -> f64 {
        self.rotation.radians()
    }

    pub fn epsilon_eq(&self, other: &Pose2d, eps: f64) -> bool {
        self.translation.epsilon_eq(&other.translation, eps)
            && self.rotation.distance(&other.rotation).abs() <= eps
    }
}

impl From<drive_if::PoseEstimate> for Pose2d {
    fn from(est: drive_if::PoseEstimate) -> Self {
        Pose2d::from_xy_heading(est.x_in, est.y_in, est.heading_rad)
    }
}
