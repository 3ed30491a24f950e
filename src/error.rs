//! Error types for the simulator crate.

use std::path::PathBuf;

use robosim_geometry::GeometryError;
use robosim_kinematics::KinematicsError;
use thiserror::Error;

/// Errors raised while loading a scene, constructing a simulator or managing
/// its thread.
///
/// Construction errors are fatal: no simulation thread is started when one of
/// them is returned.
#[derive(Debug, Error)]
pub enum SimError {
    /// The scene contained no records at all.
    #[error("scene is empty")]
    EmptyScene,

    /// The scene has a pose record but no obstacles.
    #[error("scene has no obstacles")]
    NoObstacles,

    /// A record has the wrong number of fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// 1-based line number.
        line: usize,
        /// Fields required for this record.
        expected: usize,
        /// Fields present.
        found: usize,
    },

    /// A field could not be parsed as a finite number.
    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// An obstacle record describes an invalid segment.
    #[error("line {line}: {source}")]
    InvalidSegment {
        /// 1-based line number.
        line: usize,
        /// Underlying geometry error.
        source: GeometryError,
    },

    /// The robot footprint is not a positive finite length.
    #[error("robot length must be positive and finite, got {0}")]
    InvalidRobotLength(f64),

    /// The initial pose is not finite.
    #[error("initial pose must be finite")]
    InvalidPose,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The motion model rejected a parameter.
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),

    /// Reading the scene file failed.
    #[error("failed to read scene {}: {source}", path.display())]
    Io {
        /// Path of the scene file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The simulation thread could not be spawned.
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(std::io::Error),

    /// The simulation thread panicked before reporting an outcome.
    #[error("simulation thread panicked")]
    ThreadPanicked,
}
