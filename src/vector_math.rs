//! Two-dimensional vector type used throughout the simulation.
//!
//! [`Vector2`] is a small `Copy` value with value-returning arithmetic. The
//! heavier lifting (lengths, normalisation, polar construction) delegates to
//! [`glam::DVec2`] so the maths matches what the rest of the ecosystem does.
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A 2D vector of `f64` components.
///
/// Screen convention: `x` grows to the right and `y` grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vector2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Builds a vector of length `radius` pointing at `degrees`.
    ///
    /// # Examples
    /// ```
    /// use lifesim::Vector2;
    /// let v = Vector2::polar(2.0, 90.0);
    /// assert!(v.x.abs() < 1e-9);
    /// assert!((v.y - 2.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn polar(radius: f64, degrees: f64) -> Self {
        (DVec2::from_angle(degrees.to_radians()) * radius).into()
    }

    /// Euclidean length.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        DVec2::from(self).length()
    }

    /// Returns the unit vector in the same direction.
    ///
    /// Zero-length and non-finite vectors normalise to [`Vector2::ZERO`]
    /// rather than producing `NaN`.
    ///
    /// # Examples
    /// ```
    /// use lifesim::Vector2;
    /// assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
    /// let n = Vector2::new(3.0, 4.0).normalize();
    /// assert!((n.x - 0.6).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn normalize(self) -> Self {
        let vector = DVec2::from(self);
        if !vector.is_finite() {
            return Self::ZERO;
        }
        vector.try_normalize().unwrap_or(DVec2::ZERO).into()
    }

    /// Heading in degrees, counter-clockwise as seen on screen.
    ///
    /// Because `y` points down, this is `-atan2(y, x)`; feeding the negated
    /// angle back into [`Vector2::polar`] reproduces the direction.
    #[must_use]
    pub fn angle(self) -> f64 {
        -self.y.atan2(self.x).to_degrees()
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        DVec2::from(self).dot(other.into())
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).magnitude()
    }

    /// Multiplies both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        self * factor
    }

    /// Returns `true` when both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<DVec2> for Vector2 {
    fn from(value: DVec2) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Vector2> for DVec2 {
    fn from(value: Vector2) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<f64> for Vector2 {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
