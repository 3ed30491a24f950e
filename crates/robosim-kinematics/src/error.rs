#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur when configuring the
//! motion model or stepping it forward.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for an invalid acceleration limit.
    /// This variant is returned when a limit is negative, zero or not finite.
    InvalidAccelerationLimit(&'static str),
    /// Error for negative time delta.
    /// This variant is returned when a negative time delta is used for pose updates.
    NegativeTimeDelta(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidAccelerationLimit(msg) => {
                write!(f, "Invalid acceleration limit: {}", msg)
            }
            KinematicsError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
