//! Line-segment obstacles and the two queries the simulator needs from them.

use core::fmt;

use crate::error::GeometryError;
use crate::matrix::Mat2;
use crate::vector::Vec2;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Segments shorter than this are rejected as degenerate.
const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// An immutable line segment from `p1` to `p2`.
///
/// The length, the unit direction and the raw difference `p2 - p1` are
/// computed once at construction.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    p1: Vec2,
    p2: Vec2,
    length: f64,
    direction: Vec2,
    delta: Vec2,
}

impl LineSegment {
    /// Construct a segment between two distinct, finite points.
    ///
    /// # Errors
    ///
    /// Returns `Err(GeometryError::NonFiniteCoordinate)` if an endpoint contains NaN or infinity.
    /// Returns `Err(GeometryError::DegenerateSegment)` if the endpoints coincide.
    pub fn new(p1: Vec2, p2: Vec2) -> Result<Self, GeometryError> {
        if !p1.is_finite() || !p2.is_finite() {
            return Err(GeometryError::NonFiniteCoordinate(
                "segment endpoints must be finite",
            ));
        }
        let delta = p2 - p1;
        let length = delta.norm();
        if length < MIN_SEGMENT_LENGTH {
            return Err(GeometryError::DegenerateSegment(
                "endpoints must be distinct",
            ));
        }
        Ok(LineSegment {
            p1,
            p2,
            length,
            direction: delta.scale(1.0 / length),
            delta,
        })
    }

    /// First endpoint.
    pub fn p1(&self) -> Vec2 {
        self.p1
    }

    /// Second endpoint.
    pub fn p2(&self) -> Vec2 {
        self.p2
    }

    /// Length `|p2 - p1|`.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Unit vector from `p1` towards `p2`.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Raw difference `p2 - p1`.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Vec2 {
        self.p1 + self.delta.scale(0.5)
    }

    /// The same segment shifted by `offset`.
    pub fn translated(&self, offset: Vec2) -> LineSegment {
        LineSegment {
            p1: self.p1 + offset,
            p2: self.p2 + offset,
            ..*self
        }
    }

    /// Forward distance along a ray to this segment, if the ray hits it.
    ///
    /// Solves `origin + t1·dir = p1 + t2·(p2 - p1)` where `dir` is `direction`
    /// normalized. There is no hit when the ray and segment are near-parallel
    /// (singular system), when the crossing lies off the segment
    /// (`t2 ∉ [0, 1]`), or when it lies behind or at the origin (`t1 ≤ 0`).
    ///
    /// # Arguments
    ///
    /// * `origin`: Ray start point.
    /// * `direction`: Ray direction; need not be unit length.
    ///
    /// # Returns
    ///
    /// `Some(t1)`, the distance from `origin` to the hit point, or `None`.
    pub fn ray_distance(&self, origin: Vec2, direction: Vec2) -> Option<f64> {
        let dir_unit = direction.normalize();
        let a = Mat2::with_cols(-dir_unit, self.delta);
        let t = a.inverse()? * (origin - self.p1);
        let (t1, t2) = (t.x, t.y);

        // Off the ends of the segment
        if !(0.0..=1.0).contains(&t2) {
            return None;
        }
        // Behind the ray origin
        if t1 <= 0.0 {
            return None;
        }
        Some(t1)
    }

    /// Shortest Euclidean distance from `point` to any point on the segment.
    pub fn distance_to(&self, point: Vec2) -> f64 {
        let p31 = point - self.p1;
        let projection = p31.dot(self.direction);
        if projection < 0.0 {
            // Closest to p1
            p31.norm()
        } else if projection > self.length {
            // Closest to p2
            (point - self.p2).norm()
        } else {
            (p31 - self.direction.scale(projection)).norm()
        }
    }
}

impl fmt::Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineSegment {} -> {}", self.p1, self.p2)
    }
}
