//! Rotation on the field plane

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Complex, UnitComplex};
use serde::{Deserialize, Serialize};

use super::{Translation2d, GEOM_EPSILON};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A planar rotation, stored as a unit complex number so that it always has
/// unit magnitude.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotation2d(pub UnitComplex<f64>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rotation2d {
    pub fn identity() -> Self {
        Self(UnitComplex::identity())
    }

    pub fn from_radians(angle_rad: f64) -> Self {
        Self(UnitComplex::new(angle_rad))
    }

    pub fn from_degrees(angle_deg: f64) -> Self {
        Self::from_radians(angle_deg.to_radians())
    }

    /// Rotation pointing along the vector `(x, y)`.
    ///
    /// The vector is normalised, a zero length vector gives the identity.
    pub fn from_vector(x: f64, y: f64) -> Self {
        let magnitude = x.hypot(y);
        if magnitude > GEOM_EPSILON {
            Self(UnitComplex::from_complex(Complex::new(x, y)))
        } else {
            Self::identity()
        }
    }

    /// Angle in (-pi, pi].
    pub fn radians(&self) -> f64 {
        self.0.angle()
    }

    pub fn degrees(&self) -> f64 {
        self.radians().to_degrees()
    }

    pub fn cos(&self) -> f64 {
        self.0.cos_angle()
    }

    pub fn sin(&self) -> f64 {
        self.0.sin_angle()
    }

    pub fn tan(&self) -> f64 {
        self.sin() / self.cos()
    }

    /// Compose two rotations.
    pub fn rotate_by(&self, other: &Rotation2d) -> Self {
        Self(self.0 * other.0)
    }

    pub fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }

    /// The rotation 90 degrees counter-clockwise from this one.
    pub fn normal(&self) -> Self {
        Self::from_vector(-self.sin(), self.cos())
    }

    /// Unit vector pointing along this rotation.
    pub fn to_translation(&self) -> Translation2d {
        Translation2d::new(self.cos(), self.sin())
    }

    /// Shortest-way interpolation, `x` is clamped to [0, 1].
    pub fn interpolate(&self, other: &Rotation2d, x: f64) -> Self {
        if x <= 0.0 {
            return *self;
        }
        if x >= 1.0 {
            return *other;
        }
        let angle_diff = self.distance(other);
        self.rotate_by(&Rotation2d::from_radians(angle_diff * x))
    }

    /// Signed angle from this rotation to `other`, in (-pi, pi].
    pub fn distance(&self, other: &Rotation2d) -> f64 {
        self.inverse().rotate_by(other).radians()
    }

    /// True if the two rotations point in parallel or anti-parallel
    /// directions.
    pub fn is_parallel(&self, other: &Rotation2d) -> bool {
        self.to_translation().cross(&other.to_translation()).abs() < GEOM_EPSILON
    }
}

impl Default for Rotation2d {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_rotation() {
        let r = Rotation2d::from_vector(0.0, 5.0);
        assert_relative_eq!(r.radians(), PI / 2.0);
        assert_relative_eq!(r.cos(), 0.0, epsilon = 1e-12);
        assert_eq!(Rotation2d::from_vector(0.0, 0.0), Rotation2d::identity());

        // Wrapping across +/- pi takes the short way round
        let a = Rotation2d::from_degrees(170.0);
        let b = Rotation2d::from_degrees(-170.0);
        assert_relative_eq!(a.distance(&b), 20f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(a.interpolate(&b, 0.5).degrees().abs(), 180.0, epsilon = 1e-9);

        assert_relative_eq!(
            Rotation2d::from_degrees(30.0).normal().degrees(),
            120.0,
            epsilon = 1e-9
        );
        assert!(Rotation2d::from_degrees(10.0).is_parallel(&Rotation2d::from_degrees(190.0)));
    }
}
