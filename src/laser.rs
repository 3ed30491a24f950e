//! Ray-casting laser scanner.
//!
//! The scanner sweeps [`BEAM_COUNT`] beams evenly across `[MIN_THETA, MAX_THETA]`
//! relative to the robot heading. Each beam reports the nearest obstacle hit
//! closer than `max_distance`, or the sentinel `max_distance + 1` when nothing
//! is in range.

use std::f64::consts::FRAC_PI_2;

use robosim_geometry::{Obstacle, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::noise::NoiseGenerator;

/// Number of beams in one scan.
pub const BEAM_COUNT: usize = 181;
/// Angle of the first beam relative to the heading.
pub const MIN_THETA: f64 = -FRAC_PI_2;
/// Angle of the last beam relative to the heading.
pub const MAX_THETA: f64 = FRAC_PI_2;
/// Angular resolution used to scale the angle noise.
pub const ANGULAR_RESOLUTION: f64 = (MAX_THETA - MIN_THETA) / BEAM_COUNT as f64;

/// Nominal angle of beam `index` relative to the robot heading.
pub fn beam_angle(index: usize) -> f64 {
    MIN_THETA + (MAX_THETA - MIN_THETA) * index as f64 / (BEAM_COUNT - 1) as f64
}

/// Laser range and noise parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    /// Beams see obstacles strictly closer than this.
    pub max_distance: f64,
    /// Angle noise bound, as a fraction of [`ANGULAR_RESOLUTION`].
    pub angle_error_limit: f64,
    /// Range noise bound in world units.
    pub distance_error_limit: f64,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            max_distance: 5.0,
            angle_error_limit: 0.05,
            distance_error_limit: 0.05,
        }
    }
}

impl LaserConfig {
    /// The same ranges with both noise sources switched off.
    pub fn noiseless(self) -> Self {
        Self {
            angle_error_limit: 0.0,
            distance_error_limit: 0.0,
            ..self
        }
    }

    /// Sentinel reported by beams that saw nothing.
    pub fn invalid_measurement(&self) -> f64 {
        self.max_distance + 1.0
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.max_distance.is_finite() && self.max_distance > 0.0) {
            return Err(SimError::InvalidConfig("laser.max_distance must be positive"));
        }
        if !(self.angle_error_limit.is_finite() && self.angle_error_limit >= 0.0) {
            return Err(SimError::InvalidConfig(
                "laser.angle_error_limit must be non-negative",
            ));
        }
        // Readings must never reach the sentinel, which sits 1.0 past the range.
        if !(self.distance_error_limit.is_finite()
            && (0.0..1.0).contains(&self.distance_error_limit))
        {
            return Err(SimError::InvalidConfig(
                "laser.distance_error_limit must be in [0, 1)",
            ));
        }
        Ok(())
    }
}

/// Laser scanner model.
#[derive(Debug, Clone)]
pub struct Laser {
    config: LaserConfig,
}

impl Laser {
    /// Create a scanner after validating its configuration.
    pub fn new(config: LaserConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Scanner configuration.
    pub fn config(&self) -> &LaserConfig {
        &self.config
    }

    /// Sentinel reported by beams that saw nothing.
    pub fn invalid_measurement(&self) -> f64 {
        self.config.invalid_measurement()
    }

    /// Casts every beam from `origin` and returns the measured ranges.
    ///
    /// # Arguments
    ///
    /// * `origin`: Sensor position in the world frame.
    /// * `heading`: Robot heading in radians; beam angles are relative to it.
    /// * `obstacles`: Everything the beams can hit.
    /// * `noise`: Source for angle and range noise.
    ///
    /// # Returns
    ///
    /// [`BEAM_COUNT`] ranges ordered from `MIN_THETA` to `MAX_THETA`.
    pub fn scan(
        &self,
        origin: Vec2,
        heading: f64,
        obstacles: &[Obstacle],
        noise: &mut NoiseGenerator,
    ) -> Vec<f64> {
        let angle_limit = self.config.angle_error_limit * ANGULAR_RESOLUTION;
        (0..BEAM_COUNT)
            .map(|i| {
                let theta = beam_angle(i) + heading + noise.symmetric(angle_limit);
                match self.cast(origin, Vec2::from_angle(theta), obstacles) {
                    Some(distance) => {
                        (distance + noise.symmetric(self.config.distance_error_limit)).max(0.0)
                    }
                    None => self.invalid_measurement(),
                }
            })
            .collect()
    }

    /// Nearest hit closer than `max_distance` along one ray.
    fn cast(&self, origin: Vec2, direction: Vec2, obstacles: &[Obstacle]) -> Option<f64> {
        obstacles
            .iter()
            .filter_map(|obstacle| obstacle.ray_distance(origin, direction))
            .filter(|&d| d < self.config.max_distance)
            .min_by(f64::total_cmp)
    }
}

/// One published laser scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaserScan {
    /// Measured ranges, one per beam.
    pub ranges: Vec<f64>,
    /// Sentinel value marking beams that saw nothing.
    pub invalid_measurement: f64,
    /// Wall-clock capture time in milliseconds since the Unix epoch (0 before the first scan).
    pub timestamp_ms: u64,
    /// Simulation tick that produced the scan.
    pub tick: u64,
}

impl LaserScan {
    /// A scan in which every beam is invalid, published before the first sensor tick.
    pub fn empty(invalid_measurement: f64) -> Self {
        Self {
            ranges: vec![invalid_measurement; BEAM_COUNT],
            invalid_measurement,
            timestamp_ms: 0,
            tick: 0,
        }
    }

    /// Nominal angle of beam `index` relative to the robot heading.
    pub fn beam_angle(index: usize) -> f64 {
        beam_angle(index)
    }

    /// Returns true if beam `index` hit something.
    pub fn is_valid(&self, index: usize) -> bool {
        self.ranges
            .get(index)
            .is_some_and(|&r| r < self.invalid_measurement)
    }

    /// Number of beams that hit something.
    pub fn valid_count(&self) -> usize {
        self.ranges
            .iter()
            .filter(|&&r| r < self.invalid_measurement)
            .count()
    }

    /// Shortest valid range and its beam index.
    pub fn closest(&self) -> Option<(usize, f64)> {
        self.ranges
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, r)| r < self.invalid_measurement)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// World-frame endpoints of the valid beams, using nominal beam angles.
    pub fn points(&self, origin: Vec2, heading: f64) -> Vec<Vec2> {
        self.ranges
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r < self.invalid_measurement)
            .map(|(i, &r)| origin + Vec2::from_angle(heading + Self::beam_angle(i)).scale(r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robosim_geometry::LineSegment;

    const EPSILON: f64 = 1e-9;

    fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> Obstacle {
        LineSegment::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
            .unwrap()
            .into()
    }

    fn square_room(half: f64) -> Vec<Obstacle> {
        vec![
            wall(-half, -half, half, -half),
            wall(half, -half, half, half),
            wall(half, half, -half, half),
            wall(-half, half, -half, -half),
        ]
    }

    fn noiseless_laser() -> Laser {
        Laser::new(LaserConfig::default().noiseless()).unwrap()
    }

    #[test]
    fn test_beam_angles_span_half_circle() {
        assert!((beam_angle(0) - MIN_THETA).abs() < EPSILON);
        assert!(beam_angle(90).abs() < EPSILON);
        assert!((beam_angle(BEAM_COUNT - 1) - MAX_THETA).abs() < EPSILON);
        assert!((ANGULAR_RESOLUTION - std::f64::consts::PI / 181.0).abs() < EPSILON);
    }

    #[test]
    fn test_scan_in_square_room() {
        let laser = noiseless_laser();
        let mut noise = NoiseGenerator::new(1);
        let ranges = laser.scan(Vec2::ZERO, 0.0, &square_room(2.0), &mut noise);
        assert_eq!(ranges.len(), BEAM_COUNT);
        assert!((ranges[0] - 2.0).abs() < EPSILON);
        assert!((ranges[90] - 2.0).abs() < EPSILON);
        assert!((ranges[180] - 2.0).abs() < EPSILON);
        // Beam 120 points 30° left and hits the east wall at 2 / cos(30°)
        let expected = 2.0 / (std::f64::consts::PI / 6.0).cos();
        assert!((ranges[120] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_scan_respects_heading() {
        let laser = noiseless_laser();
        let mut noise = NoiseGenerator::new(1);
        let obstacles = vec![wall(-1.0, 3.0, 1.0, 3.0)];
        let ranges = laser.scan(Vec2::ZERO, FRAC_PI_2, &obstacles, &mut noise);
        assert!((ranges[90] - 3.0).abs() < EPSILON);
        assert_eq!(ranges[0], laser.invalid_measurement());
        assert_eq!(ranges[180], laser.invalid_measurement());
    }

    #[test]
    fn test_scan_keeps_nearest_obstacle() {
        let laser = noiseless_laser();
        let mut noise = NoiseGenerator::new(1);
        let obstacles = vec![wall(3.0, -1.0, 3.0, 1.0), wall(1.5, -1.0, 1.5, 1.0)];
        let ranges = laser.scan(Vec2::ZERO, 0.0, &obstacles, &mut noise);
        assert!((ranges[90] - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let laser = noiseless_laser();
        let mut noise = NoiseGenerator::new(1);
        let obstacles = square_room(10.0);
        let ranges = laser.scan(Vec2::ZERO, 0.0, &obstacles, &mut noise);
        assert!(ranges.iter().all(|&r| r == laser.invalid_measurement()));
        assert_eq!(laser.invalid_measurement(), 6.0);
    }

    #[test]
    fn test_noiseless_scan_is_idempotent() {
        let laser = noiseless_laser();
        let obstacles = square_room(1.7);
        let origin = Vec2::new(0.3, -0.4);
        let first = laser.scan(origin, 0.7, &obstacles, &mut NoiseGenerator::new(0));
        let second = laser.scan(origin, 0.7, &obstacles, &mut NoiseGenerator::new(0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_noise_is_bounded() {
        let laser = Laser::new(LaserConfig::default()).unwrap();
        let obstacles = square_room(2.0);
        let mut noise = NoiseGenerator::new(1234);
        for _ in 0..50 {
            let ranges = laser.scan(Vec2::ZERO, 0.0, &obstacles, &mut noise);
            // Angle noise alone moves the straight-ahead reading by well under 1e-5.
            assert!((ranges[90] - 2.0).abs() <= 0.05 + 1e-5);
        }
    }

    #[test]
    fn test_seeded_scans_repeat() {
        let laser = Laser::new(LaserConfig::default()).unwrap();
        let obstacles = square_room(2.0);
        let a = laser.scan(Vec2::ZERO, 0.1, &obstacles, &mut NoiseGenerator::new(5));
        let b = laser.scan(Vec2::ZERO, 0.1, &obstacles, &mut NoiseGenerator::new(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_validation() {
        assert!(LaserConfig::default().validate().is_ok());
        let bad_range = LaserConfig { max_distance: 0.0, ..LaserConfig::default() };
        assert!(matches!(bad_range.validate(), Err(SimError::InvalidConfig(_))));
        let bad_noise = LaserConfig { distance_error_limit: 1.0, ..LaserConfig::default() };
        assert!(matches!(bad_noise.validate(), Err(SimError::InvalidConfig(_))));
        let bad_angle = LaserConfig { angle_error_limit: -0.1, ..LaserConfig::default() };
        assert!(Laser::new(bad_angle).is_err());
    }

    #[test]
    fn test_scan_helpers() {
        let mut scan = LaserScan::empty(6.0);
        assert_eq!(scan.valid_count(), 0);
        assert!(scan.closest().is_none());
        assert!(!scan.is_valid(0));
        assert!(!scan.is_valid(BEAM_COUNT));

        scan.ranges[90] = 2.0;
        scan.ranges[10] = 1.0;
        assert_eq!(scan.valid_count(), 2);
        assert_eq!(scan.closest(), Some((10, 1.0)));

        let points = scan.points(Vec2::new(1.0, 0.0), 0.0);
        assert_eq!(points.len(), 2);
        let ahead = points[1];
        assert!((ahead.x - 3.0).abs() < EPSILON);
        assert!(ahead.y.abs() < EPSILON);
    }
}
