//! Scene files: the initial robot pose and the obstacle set.
//!
//! A scene is plain text with one whitespace-separated record per line. The
//! first record is `x y θ robot_length`; every following record is a wall
//! `x1 y1 x2 y2`. Blank lines are skipped and `#` starts a comment.

use std::fs;
use std::path::Path;

use robosim_geometry::{Bounds, LineSegment, Obstacle, Vec2};
use robosim_kinematics::Pose;
use tracing::info;

use crate::error::SimError;

const POSE_FIELDS: usize = 4;
const SEGMENT_FIELDS: usize = 4;

/// Initial conditions for one simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Initial true pose.
    pub pose: Pose,
    /// Collision radius and sensor lever arm.
    pub robot_length: f64,
    /// Static obstacles.
    pub obstacles: Vec<Obstacle>,
}

impl Scene {
    /// Parses scene text.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the 1-based line number when a record has the
    /// wrong number of fields, a field is not a finite number, or a wall is
    /// degenerate. Returns `SimError::EmptyScene` or `SimError::NoObstacles`
    /// when records are missing.
    pub fn parse(text: &str) -> Result<Self, SimError> {
        let mut records = text.lines().enumerate().filter_map(|(i, line)| {
            let content = line.split('#').next().unwrap_or_default().trim();
            (!content.is_empty()).then_some((i + 1, content))
        });

        let (line, record) = records.next().ok_or(SimError::EmptyScene)?;
        let [x, y, theta, robot_length] = parse_record::<POSE_FIELDS>(line, record)?;

        let obstacles = records
            .map(|(line, record)| {
                let [x1, y1, x2, y2] = parse_record::<SEGMENT_FIELDS>(line, record)?;
                LineSegment::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
                    .map(Obstacle::from)
                    .map_err(|source| SimError::InvalidSegment { line, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if obstacles.is_empty() {
            return Err(SimError::NoObstacles);
        }

        Ok(Scene {
            pose: Pose::new(x, y, theta),
            robot_length,
            obstacles,
        })
    }

    /// Reads and parses a scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Scene::parse(&text)?;
        info!(
            path = %path.display(),
            obstacles = scene.obstacles.len(),
            pose = %scene.pose,
            "Loaded scene"
        );
        Ok(scene)
    }

    /// Bounding box of all obstacles.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_obstacles(&self.obstacles)
    }

    /// Shifts the pose and every obstacle so the obstacle bounding box is
    /// centered on the origin.
    pub fn recentered(self) -> Self {
        let Some(bounds) = self.bounds() else {
            return self;
        };
        let offset = -bounds.center();
        Scene {
            pose: Pose::new(self.pose.x + offset.x, self.pose.y + offset.y, self.pose.theta),
            robot_length: self.robot_length,
            obstacles: self
                .obstacles
                .iter()
                .map(|obstacle| obstacle.translated(offset))
                .collect(),
        }
    }
}

fn parse_record<const N: usize>(line: usize, record: &str) -> Result<[f64; N], SimError> {
    let tokens: Vec<&str> = record.split_whitespace().collect();
    if tokens.len() != N {
        return Err(SimError::FieldCount {
            line,
            expected: N,
            found: tokens.len(),
        });
    }
    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SimError::InvalidNumber {
                line,
                token: token.to_string(),
            })?;
    }
    Ok(values)
}
