#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library of 2D geometry primitives for the robosim simulator."]
#![doc = ""]
#![doc = "This crate provides small vector and matrix types, line-segment obstacles,"]
#![doc = "ray intersection and point-to-segment distance queries."]

pub mod error;
pub mod matrix;
pub mod obstacle;
pub mod segment;
pub mod vector;

pub use error::GeometryError;
pub use matrix::{Mat2, SINGULAR_LIMIT};
pub use obstacle::{Bounds, Obstacle};
pub use segment::LineSegment;
pub use vector::{NORMALIZE_EPSILON, Vec2, Vec3};
