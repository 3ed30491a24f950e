//! Plain 2D and 3D vectors.
//!
//! Both types are `Copy` values: every operation returns a new vector and
//! state updates are plain assignment.

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};
use libm::{cos, sin, sqrt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Vectors with a norm below this value are left untouched by `normalize`.
pub const NORMALIZE_EPSILON: f64 = 1e-6;

/// A 2‑D vector (or point) in world units.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    /// Construct a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Unit vector pointing along `theta` radians (counter‑clockwise from +x).
    pub fn from_angle(theta: f64) -> Self {
        Vec2::new(cos(theta), sin(theta))
    }

    /// Component-wise sum.
    pub fn plus(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference `self - other`.
    pub fn minus(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    /// Multiply both components by `t`.
    pub fn scale(self, t: f64) -> Vec2 {
        Vec2::new(self.x * t, self.y * t)
    }

    /// Dot product.
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean norm.
    pub fn squared_norm(self) -> f64 {
        self.dot(self)
    }

    /// Euclidean norm.
    pub fn norm(self) -> f64 {
        sqrt(self.squared_norm())
    }

    /// Unit vector in the same direction.
    ///
    /// A vector whose norm is below [`NORMALIZE_EPSILON`] is returned unchanged.
    pub fn normalize(self) -> Vec2 {
        let n = self.norm();
        if n < NORMALIZE_EPSILON {
            self
        } else {
            self.scale(1.0 / n)
        }
    }

    /// Distance between two points.
    pub fn distance(self, other: Vec2) -> f64 {
        self.minus(other).norm()
    }

    /// Returns true if both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        self.plus(rhs)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        self.minus(rhs)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        self.scale(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        self.scale(-1.0)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// A 3‑D vector. The simulator uses it as integration state `(x, y, θ)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component (heading when used as a pose).
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Construct a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// Component-wise sum.
    pub fn plus(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise difference `self - other`.
    pub fn minus(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Multiply every component by `t`.
    pub fn scale(self, t: f64) -> Vec3 {
        Vec3::new(self.x * t, self.y * t, self.z * t)
    }

    /// Dot product.
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean norm.
    pub fn norm(self) -> f64 {
        sqrt(self.dot(self))
    }

    /// Unit vector in the same direction, or `self` if the norm is below
    /// [`NORMALIZE_EPSILON`].
    pub fn normalize(self) -> Vec3 {
        let n = self.norm();
        if n < NORMALIZE_EPSILON {
            self
        } else {
            self.scale(1.0 / n)
        }
    }

    /// The `(x, y)` part.
    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        self.plus(rhs)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        self.minus(rhs)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        self.scale(rhs)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(a - b, Vec2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert!((a.dot(b) - 1.0).abs() < EPSILON);
        assert!((Vec2::new(3.0, 4.0).norm() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vec2::new(3.0, 4.0).normalize();
        assert!((v.norm() - 1.0).abs() < EPSILON);
        assert!((v.x - 0.6).abs() < EPSILON);
        assert!((v.y - 0.8).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_near_zero_is_noop() {
        let tiny = Vec2::new(1e-8, -1e-8);
        assert_eq!(tiny.normalize(), tiny);
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let tiny3 = Vec3::new(1e-9, 0.0, 1e-9);
        assert_eq!(tiny3.normalize(), tiny3);
    }

    #[test]
    fn test_from_angle() {
        let v = Vec2::from_angle(core::f64::consts::FRAC_PI_2);
        assert!(v.x.abs() < EPSILON);
        assert!((v.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_vec3_ops() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a.xy(), Vec2::new(1.0, 2.0));
    }
}
