//! Translation on the field plane

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

use super::Rotation2d;
use util::maths::{interpolate, limit};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 2D translation (or point) in inches.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation2d(pub Vector2<f64>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Translation2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Vector2::new(x, y))
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0)
    }

    /// The translation which takes `start` to `end`.
    pub fn between(start: &Translation2d, end: &Translation2d) -> Self {
        Self(end.0 - start.0)
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    pub fn translate_by(&self, other: &Translation2d) -> Self {
        Self(self.0 + other.0)
    }

    /// Rotate this translation about the origin.
    pub fn rotate_by(&self, rotation: &Rotation2d) -> Self {
        Self(rotation.0 * self.0)
    }

    pub fn scale(&self, s: f64) -> Self {
        Self(self.0 * s)
    }

    pub fn inverse(&self) -> Self {
        Self(-self.0)
    }

    pub fn dot(&self, other: &Translation2d) -> f64 {
        self.0.dot(&other.0)
    }

    /// Z component of the 3D cross product.
    pub fn cross(&self, other: &Translation2d) -> f64 {
        self.0.perp(&other.0)
    }

    /// The direction of this translation. The zero vector maps to identity.
    pub fn direction(&self) -> Rotation2d {
        Rotation2d::from_vector(self.x(), self.y())
    }

    /// Unsigned angle between two translations, in [0, pi].
    pub fn angle(a: &Translation2d, b: &Translation2d) -> f64 {
        let cos_angle = a.dot(b) / (a.norm() * b.norm());
        if cos_angle.is_nan() {
            return 0.0;
        }
        limit(cos_angle, -1.0, 1.0).acos()
    }

    /// Linear interpolation, `x` is clamped to [0, 1].
    pub fn interpolate(&self, other: &Translation2d, x: f64) -> Self {
        Self::new(
            interpolate(self.x(), other.x(), x),
            interpolate(self.y(), other.y(), x),
        )
    }

    /// Linear extrapolation, `x` is not clamped.
    pub fn extrapolate(&self, other: &Translation2d, x: f64) -> Self {
        Self(self.0 + (other.0 - self.0) * x)
    }

    pub fn distance(&self, other: &Translation2d) -> f64 {
        (other.0 - self.0).norm()
    }

    pub fn epsilon_eq(&self, other: &Translation2d, eps: f64) -> bool {
        self.distance(other) <= eps
    }
}

impl Add for Translation2d {
    type Output = Translation2d;

    fn add(self, rhs: Translation2d) -> Translation2d {
        self.translate_by(&rhs)
    }
}

impl Sub for Translation2d {
    type Output = Translation2d;

    fn sub(self, rhs: Translation2d) -> Translation2d {
        Translation2d::between(&rhs, &self)
    }
}

impl Neg for Translation2d {
    type Output = Translation2d;

    fn neg(self) -> Translation2d {
        self.inverse()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_translation() {
        let a = Translation2d::new(3.0, 4.0);
        assert_relative_eq!(a.norm(), 5.0);

        let r = a.rotate_by(&Rotation2d::from_degrees(90.0));
        assert_relative_eq!(r.x(), -4.0, epsilon = 1e-12);
        assert_relative_eq!(r.y(), 3.0, epsilon = 1e-12);

        let b = Translation2d::new(1.0, 0.0);
        let c = Translation2d::new(0.0, 2.0);
        assert_relative_eq!(b.cross(&c), 2.0);
        assert_relative_eq!(Translation2d::angle(&b, &c), PI / 2.0);
        assert_eq!(Translation2d::angle(&b, &Translation2d::identity()), 0.0);

        let m = b.interpolate(&c, 0.5);
        assert_relative_eq!(m.x(), 0.5);
        assert_relative_eq!(m.y(), 1.0);
        assert_eq!(b.interpolate(&c, 2.0), c);
        assert_eq!(b.extrapolate(&c, 2.0), Translation2d::new(-1.0, 4.0));
    }
}
