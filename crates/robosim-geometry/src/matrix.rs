//! A minimal 2×2 matrix, enough to solve the ray/segment system.

use core::ops::Mul;
use libm::fabs;

use crate::vector::Vec2;

/// Matrices whose determinant magnitude is below this are treated as singular.
pub const SINGULAR_LIMIT: f64 = 1e-6;

/// Row-major 2×2 matrix
///
/// ```text
/// | a  b |
/// | c  d |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2 {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Mat2 {
    /// Construct from row-major entries.
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Mat2 { a, b, c, d }
    }

    /// Construct from two column vectors.
    pub const fn with_cols(col1: Vec2, col2: Vec2) -> Self {
        Mat2::new(col1.x, col2.x, col1.y, col2.y)
    }

    /// Determinant `ad - bc`.
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns true when `|det| < SINGULAR_LIMIT`.
    pub fn is_singular(&self) -> bool {
        fabs(self.determinant()) < SINGULAR_LIMIT
    }

    /// Inverse matrix, or `None` if the matrix is (near) singular.
    pub fn inverse(&self) -> Option<Mat2> {
        if self.is_singular() {
            return None;
        }
        let inv_det = 1.0 / self.determinant();
        Some(Mat2::new(
            self.d * inv_det,
            -self.b * inv_det,
            -self.c * inv_det,
            self.a * inv_det,
        ))
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.a * v.x + self.b * v.y, self.c * v.x + self.d * v.y)
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        self.mul_vec(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_with_cols_layout() {
        let m = Mat2::with_cols(Vec2::new(1.0, 3.0), Vec2::new(2.0, 4.0));
        assert_eq!(m, Mat2::new(1.0, 2.0, 3.0, 4.0));
        assert!((m.determinant() - (-2.0)).abs() < EPSILON);
    }

    #[test]
    fn test_inverse_round_trips_vector() {
        let m = Mat2::new(2.0, 1.0, -1.0, 3.0);
        let inv = m.inverse().unwrap();
        let v = Vec2::new(0.7, -2.5);
        let back = inv * (m * v);
        assert!((back.x - v.x).abs() < EPSILON);
        assert!((back.y - v.y).abs() < EPSILON);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let m = Mat2::with_cols(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0));
        assert!(m.is_singular());
        assert!(m.inverse().is_none());

        // Just under the threshold still counts as singular.
        let nearly = Mat2::new(1.0, 0.0, 0.0, 0.5e-6);
        assert!(nearly.inverse().is_none());
    }
}
