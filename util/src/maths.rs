//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default tolerance used when comparing floating point quantities.
pub const EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Return true if `a` and `b` are within `eps` of one another.
pub fn epsilon_eq<T>(a: T, b: T, eps: T) -> bool
where
    T: Float
{
    (a - b).abs() <= eps
}

/// Linear interpolation between `a` and `b`, with `x` clamped to [0, 1].
pub fn interpolate<T>(a: T, b: T, x: T) -> T
where
    T: Float
{
    let x = limit(x, T::zero(), T::one());
    a + (b - a) * x
}

/// Saturate a value into the range [min, max].
pub fn limit<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Zero the value if it lies within `deadband` of zero.
pub fn deadband<T>(value: T, deadband: T) -> T
where
    T: Float
{
    if value.abs() < deadband {
        T::zero()
    }
    else {
        value
    }
}

/// `sin(x)/x`, continuous through zero.
pub fn sinc<T>(x: T) -> T
where
    T: Float
{
    if x.abs() < T::epsilon().sqrt() {
        // Taylor expansion about zero
        T::one() - x * x / (T::one() + T::one() + T::one() + T::one() + T::one() + T::one())
    }
    else {
        x.sin() / x
    }
}

/// Sign of the value, with zero mapping to zero (unlike `Float::signum`).
pub fn sign<T>(value: T) -> T
where
    T: Float
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float + FloatConst
{
    let tau = T::TAU();
    let mut a = rem_euclid(angle + T::PI(), tau) - T::PI();

    if a <= -T::PI() {
        a = a + tau;
    }

    a
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_wrap_pi() {
        assert_relative_eq!(wrap_pi(0.5f64), 0.5);
        assert_relative_eq!(wrap_pi(PI), PI);
        assert_relative_eq!(wrap_pi(-PI), PI);
        assert_relative_eq!(wrap_pi(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(-5.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_small_helpers() {
        assert_eq!(deadband(0.03, 0.04), 0.0);
        assert_eq!(deadband(-0.05, 0.04), -0.05);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(interpolate(2.0, 4.0, 1.5), 4.0);
        assert_relative_eq!(sinc(0.0f64), 1.0);
        assert_relative_eq!(sinc(0.5f64), 0.5f64.sin() / 0.5);
        assert!(epsilon_eq(1.0, 1.0 + 1e-12, EPSILON));
    }
}
