#![warn(missing_docs)]

//! Error types for the geometry library.
//!
//! Geometric degeneracy during queries (parallel rays, points past a segment
//! end) is ordinary data and never reported here. These errors only cover
//! shapes that cannot be constructed.

use core::fmt;

/// Errors that can occur when constructing geometric primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Error for a zero-length line segment.
    /// This variant is returned when both endpoints of a segment coincide.
    DegenerateSegment(&'static str),
    /// Error for non-finite coordinates.
    /// This variant is returned when an endpoint contains NaN or infinity.
    NonFiniteCoordinate(&'static str),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::DegenerateSegment(msg) => write!(f, "Degenerate segment: {}", msg),
            GeometryError::NonFiniteCoordinate(msg) => write!(f, "Non-finite coordinate: {}", msg),
        }
    }
}

impl core::error::Error for GeometryError {}
