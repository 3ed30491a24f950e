//! Static obstacles the robot can collide with or sense.

use crate::segment::LineSegment;
use crate::vector::Vec2;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A static obstacle shape.
///
/// Only line segments exist today; new shapes become new variants.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Obstacle {
    /// A straight wall between two points.
    Segment(LineSegment),
}

impl Obstacle {
    /// Forward distance along a ray to this obstacle, if it is hit.
    pub fn ray_distance(&self, origin: Vec2, direction: Vec2) -> Option<f64> {
        match self {
            Obstacle::Segment(segment) => segment.ray_distance(origin, direction),
        }
    }

    /// Shortest distance from `point` to the obstacle.
    pub fn distance_to(&self, point: Vec2) -> f64 {
        match self {
            Obstacle::Segment(segment) => segment.distance_to(point),
        }
    }

    /// The same obstacle shifted by `offset`.
    pub fn translated(&self, offset: Vec2) -> Obstacle {
        match self {
            Obstacle::Segment(segment) => Obstacle::Segment(segment.translated(offset)),
        }
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Bounds {
        match self {
            Obstacle::Segment(segment) => Bounds::from_corners(segment.p1(), segment.p2()),
        }
    }
}

impl From<LineSegment> for Obstacle {
    fn from(segment: LineSegment) -> Self {
        Obstacle::Segment(segment)
    }
}

/// Axis-aligned bounding box.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Bounds {
    /// Smallest box containing both points.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Bounds {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Bounding box of a set of obstacles, or `None` if the set is empty.
    pub fn of_obstacles<'a, I>(obstacles: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a Obstacle>,
    {
        obstacles
            .into_iter()
            .map(Obstacle::bounds)
            .reduce(Bounds::union)
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        self.min + (self.max - self.min).scale(0.5)
    }

    /// Width and height.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}
