//! The simulated robot: true pose, acceleration-limited control tracking and
//! collision detection.

use robosim_geometry::{Obstacle, Vec2};
use robosim_kinematics::{AccelerationLimits, Pose, Twist, rate_limit, rk4_step, unicycle_derivative};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SimError;
use crate::noise::NoiseGenerator;

/// Motion model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Maximum change of linear velocity per second.
    pub max_linear_acceleration: f64,
    /// Maximum change of angular velocity per second.
    pub max_angular_acceleration: f64,
    /// Relative noise bound on the integrated linear velocity.
    pub linear_velocity_error_limit: f64,
    /// Relative noise bound on the integrated angular velocity.
    pub angular_velocity_error_limit: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            max_linear_acceleration: 3.0,
            max_angular_acceleration: 3.0,
            linear_velocity_error_limit: 0.1,
            angular_velocity_error_limit: 0.1,
        }
    }
}

impl RobotConfig {
    /// The same limits with velocity noise switched off.
    pub fn noiseless(self) -> Self {
        Self {
            linear_velocity_error_limit: 0.0,
            angular_velocity_error_limit: 0.0,
            ..self
        }
    }

    /// Acceleration limits derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err(SimError::Kinematics)` if a limit is not positive and finite.
    pub fn limits(&self) -> Result<AccelerationLimits, SimError> {
        Ok(AccelerationLimits::new(
            self.max_linear_acceleration,
            self.max_angular_acceleration,
        )?)
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), SimError> {
        self.limits()?;
        for limit in [
            self.linear_velocity_error_limit,
            self.angular_velocity_error_limit,
        ] {
            if !(limit.is_finite() && limit >= 0.0) {
                return Err(SimError::InvalidConfig(
                    "robot velocity error limits must be non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Lifecycle of the robot. `Crashed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RobotState {
    /// The robot accepts control ticks.
    Running,
    /// The robot hit an obstacle and is frozen.
    Crashed,
}

/// Result of one control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlUpdate {
    /// Rate-limited, noise-free control now in effect.
    pub control: Twist,
    /// True pose after integration.
    pub pose: Pose,
    /// State after the collision check.
    pub state: RobotState,
}

/// Simulated unicycle robot.
#[derive(Debug, Clone)]
pub struct Robot {
    length: f64,
    pose: Pose,
    current_control: Twist,
    state: RobotState,
    limits: AccelerationLimits,
    linear_velocity_error_limit: f64,
    angular_velocity_error_limit: f64,
}

impl Robot {
    /// Create a robot at rest.
    ///
    /// # Arguments
    ///
    /// * `pose`: Initial true pose.
    /// * `length`: Collision radius and sensor lever arm.
    /// * `config`: Motion model parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the pose is not finite, the length is not positive
    /// and finite, or the configuration is invalid.
    pub fn new(pose: Pose, length: f64, config: &RobotConfig) -> Result<Self, SimError> {
        if !pose.is_finite() {
            return Err(SimError::InvalidPose);
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(SimError::InvalidRobotLength(length));
        }
        config.validate()?;
        Ok(Self {
            length,
            pose,
            current_control: Twist::ZERO,
            state: RobotState::Running,
            limits: config.limits()?,
            linear_velocity_error_limit: config.linear_velocity_error_limit,
            angular_velocity_error_limit: config.angular_velocity_error_limit,
        })
    }

    /// Collision radius and sensor lever arm.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// True pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Rate-limited control applied during the last tick.
    pub fn current_control(&self) -> Twist {
        self.current_control
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn is_crashed(&self) -> bool {
        self.state == RobotState::Crashed
    }

    /// Laser origin: half a robot length behind the pose along the heading.
    pub fn sensor_origin(&self) -> Vec2 {
        self.pose.position() - self.pose.heading().scale(0.5 * self.length)
    }

    /// Returns true if any obstacle is closer to the pose than the robot length.
    pub fn collides(&self, obstacles: &[Obstacle]) -> bool {
        let position = self.pose.position();
        obstacles
            .iter()
            .any(|obstacle| obstacle.distance_to(position) < self.length)
    }

    /// Advances the robot by one control tick.
    ///
    /// The goal is rate-limited into the current control, velocity noise is
    /// applied to a copy of it, and the pose is integrated with one RK4 step.
    /// A crashed robot is left untouched.
    ///
    /// # Arguments
    ///
    /// * `goal`: Requested control.
    /// * `dt`: Tick duration in seconds.
    /// * `obstacles`: Obstacles checked for collision after the move.
    /// * `noise`: Source for velocity noise.
    pub fn control_tick(
        &mut self,
        goal: Twist,
        dt: f64,
        obstacles: &[Obstacle],
        noise: &mut NoiseGenerator,
    ) -> ControlUpdate {
        if self.is_crashed() {
            return self.update();
        }

        self.current_control = rate_limit(self.current_control, goal, &self.limits, dt);

        let mut applied = self.current_control;
        if !applied.is_zero() {
            applied.v *= 1.0 + noise.symmetric(self.linear_velocity_error_limit);
            applied.omega *= 1.0 + noise.symmetric(self.angular_velocity_error_limit);
        }

        let next = rk4_step(self.pose.to_state(), dt, |state| {
            unicycle_derivative(state, applied)
        });
        self.pose = Pose::from_state(next);
        self.pose.theta = Pose::normalize_angle(self.pose.theta);
        debug!(pose = %self.pose, control = %self.current_control, "control tick");

        if self.collides(obstacles) {
            self.state = RobotState::Crashed;
            info!(pose = %self.pose, "Robot crashed into an obstacle");
        }
        self.update()
    }

    fn update(&self) -> ControlUpdate {
        ControlUpdate {
            control: self.current_control,
            pose: self.pose,
            state: self.state,
        }
    }
}
