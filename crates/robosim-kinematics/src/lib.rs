#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for unicycle robot kinematics."]
#![doc = ""]
#![doc = "This crate provides pose and twist types, the continuous-time unicycle model,"]
#![doc = "a classical RK4 integrator and acceleration-limited control tracking."]

use core::f64::consts::PI;
use core::fmt;
use libm::{cos, fabs, sin};

use robosim_geometry::{Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// A 2‑D pose `(x, y, θ)` in world units and radians (θ measured counter‑clockwise
/// from the x‑axis in the world frame).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position.
    pub x: f64,
    /// World‑frame y position.
    pub y: f64,
    /// Heading (rad), normalized to `[-PI, PI)` after every integration step.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position.
    /// * `y`: World-frame y position.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    ///
    /// # Arguments
    ///
    /// * `angle`: The angle in radians to normalize.
    ///
    /// # Returns
    ///
    /// The normalized angle in radians.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }

    /// World-frame position.
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Unit vector along the heading.
    pub fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.theta)
    }

    /// The pose as integration state `(x, y, θ)`.
    pub fn to_state(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.theta)
    }

    /// Build a pose from integration state `(x, y, θ)`.
    pub fn from_state(state: Vec3) -> Self {
        Pose::new(state.x, state.y, state.z)
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2} rad)", self.x, self.y, self.theta)
    }
}

/// A twist expressed in the robot base frame: linear speed along the heading
/// and angular speed around the vertical axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist {
    /// Linear velocity along the heading (units/s).
    pub v: f64,
    /// Angular velocity (rad/s).
    pub omega: f64,
}

impl Twist {
    /// The zero twist (robot at rest).
    pub const ZERO: Twist = Twist::new(0.0, 0.0);

    /// Construct a new twist.
    ///
    /// # Arguments
    ///
    /// * `v`: Linear velocity along the robot's heading.
    /// * `omega`: Angular velocity around the robot's z-axis (rad/s).
    pub const fn new(v: f64, omega: f64) -> Self {
        Twist { v, omega }
    }

    /// Returns true if both components are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.v == 0.0 && self.omega == 0.0
    }

    /// Returns true if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.v.is_finite() && self.omega.is_finite()
    }
}

impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.2}, ω: {:.2} rad/s)", self.v, self.omega)
    }
}

/// Separate linear and angular acceleration limits.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationLimits {
    linear: f64,
    angular: f64,
}

impl AccelerationLimits {
    /// Construct acceleration limits.
    ///
    /// # Arguments
    ///
    /// * `linear`: Maximum linear acceleration (units/s²).
    /// * `angular`: Maximum angular acceleration (rad/s²).
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidAccelerationLimit)` if either limit is not
    /// positive and finite.
    pub fn new(linear: f64, angular: f64) -> Result<Self, KinematicsError> {
        if !(linear.is_finite() && linear > 0.0) {
            return Err(KinematicsError::InvalidAccelerationLimit(
                "linear limit must be positive",
            ));
        }
        if !(angular.is_finite() && angular > 0.0) {
            return Err(KinematicsError::InvalidAccelerationLimit(
                "angular limit must be positive",
            ));
        }
        Ok(AccelerationLimits { linear, angular })
    }

    /// Maximum linear acceleration.
    pub fn linear(&self) -> f64 {
        self.linear
    }

    /// Maximum angular acceleration.
    pub fn angular(&self) -> f64 {
        self.angular
    }
}

/// Clamp `step` to `[-max_step, max_step]`, keeping its sign.
fn clamp_step(step: f64, max_step: f64) -> f64 {
    if fabs(step) > max_step {
        if step > 0.0 { max_step } else { -max_step }
    } else {
        step
    }
}

/// Move `current` towards `goal` without exceeding the acceleration limits.
///
/// Each component changes by at most `limit · dt` per call; the linear and
/// angular components are limited independently.
///
/// # Arguments
///
/// * `current`: The control applied during the previous step.
/// * `goal`: The requested control.
/// * `limits`: Acceleration limits.
/// * `dt`: Step duration in seconds.
///
/// # Returns
///
/// The rate-limited control for this step.
pub fn rate_limit(current: Twist, goal: Twist, limits: &AccelerationLimits, dt: f64) -> Twist {
    let dv = clamp_step(goal.v - current.v, limits.linear * dt);
    let domega = clamp_step(goal.omega - current.omega, limits.angular * dt);
    Twist::new(current.v + dv, current.omega + domega)
}

/// Time derivative of the unicycle state `(x, y, θ)` under `twist`:
/// `ẋ = v cos θ`, `ẏ = v sin θ`, `θ̇ = ω`.
pub fn unicycle_derivative(state: Vec3, twist: Twist) -> Vec3 {
    Vec3::new(twist.v * cos(state.z), twist.v * sin(state.z), twist.omega)
}

/// One step of classical fourth-order Runge-Kutta.
///
/// ```text
/// k1 = f(x)
/// k2 = f(x + k1·dt/2)
/// k3 = f(x + k2·dt/2)
/// k4 = f(x + k3·dt)
/// x' = x + (k1 + 2k2 + 2k3 + k4)·dt/6
/// ```
pub fn rk4_step<F>(state: Vec3, dt: f64, f: F) -> Vec3
where
    F: Fn(Vec3) -> Vec3,
{
    let k1 = f(state);
    let k2 = f(state + k1.scale(0.5 * dt));
    let k3 = f(state + k2.scale(0.5 * dt));
    let k4 = f(state + k3.scale(dt));
    let average = k1 + k2.scale(2.0) + k3.scale(2.0) + k4;
    state + average.scale(dt / 6.0)
}

/// Advances a pose under a constant twist by one RK4 step of the unicycle model.
///
/// The resulting heading is normalized to `[-PI, PI)`.
///
/// # Errors
///
/// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative.
pub fn integrate_pose(pose: Pose, twist: Twist, dt: f64) -> Result<Pose, KinematicsError> {
    if dt < 0.0 {
        return Err(KinematicsError::NegativeTimeDelta("must be non-negative"));
    }
    let next = rk4_step(pose.to_state(), dt, |state| unicycle_derivative(state, twist));
    let mut pose = Pose::from_state(next);
    pose.theta = Pose::normalize_angle(pose.theta);
    Ok(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    fn limits() -> AccelerationLimits {
        AccelerationLimits::new(3.0, 0.5).unwrap()
    }

    #[test]
    fn test_pose_normalization() {
        assert!((Pose::normalize_angle(0.0) - 0.0).abs() < EPSILON);
        assert!((Pose::normalize_angle(PI) - (-PI)).abs() < EPSILON);
        assert!((Pose::normalize_angle(-PI) - -PI).abs() < EPSILON);
        assert!((Pose::normalize_angle(2.5 * PI) - 0.5 * PI).abs() < EPSILON);
        assert!((Pose::normalize_angle(-2.5 * PI) - -0.5 * PI).abs() < EPSILON);
    }

    #[test]
    fn test_pose_state_conversion() {
        let pose = Pose::new(1.0, -2.0, 0.3);
        assert_eq!(Pose::from_state(pose.to_state()), pose);
        assert_eq!(pose.position(), Vec2::new(1.0, -2.0));
        assert!((pose.heading().norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_acceleration_limits_constructor() {
        assert!(AccelerationLimits::new(1.0, 2.0).is_ok());
        assert!(matches!(
            AccelerationLimits::new(0.0, 2.0),
            Err(KinematicsError::InvalidAccelerationLimit(_))
        ));
        assert!(matches!(
            AccelerationLimits::new(1.0, -2.0),
            Err(KinematicsError::InvalidAccelerationLimit(_))
        ));
        assert!(matches!(
            AccelerationLimits::new(f64::INFINITY, 2.0),
            Err(KinematicsError::InvalidAccelerationLimit(_))
        ));
    }

    #[test]
    fn test_rate_limit_clamps_each_component() {
        let dt = 0.01;
        let next = rate_limit(Twist::ZERO, Twist::new(10.0, -10.0), &limits(), dt);
        assert!((next.v - 0.03).abs() < EPSILON);
        assert!((next.omega - (-0.005)).abs() < EPSILON);
    }

    #[test]
    fn test_rate_limit_reaches_small_goal_exactly() {
        let goal = Twist::new(0.01, 0.001);
        let next = rate_limit(Twist::ZERO, goal, &limits(), 0.01);
        assert_eq!(next, goal);
    }

    #[test]
    fn test_rate_limit_decelerates() {
        let next = rate_limit(Twist::new(1.0, 0.2), Twist::ZERO, &limits(), 0.1);
        assert!((next.v - 0.7).abs() < EPSILON);
        assert!((next.omega - 0.15).abs() < EPSILON);
    }

    #[test]
    fn test_rate_limit_never_exceeds_limit() {
        let l = limits();
        let goals = [-50.0, -1.0, -0.001, 0.0, 0.002, 0.7, 42.0];
        let dts = [0.001, 0.01, 0.1, 1.0];
        for &dt in &dts {
            for &gv in &goals {
                for &gw in &goals {
                    let mut current = Twist::new(0.3, -0.2);
                    for _ in 0..50 {
                        let next = rate_limit(current, Twist::new(gv, gw), &l, dt);
                        assert!((next.v - current.v).abs() <= l.linear() * dt + EPSILON);
                        assert!((next.omega - current.omega).abs() <= l.angular() * dt + EPSILON);
                        current = next;
                    }
                }
            }
        }
    }

    #[test]
    fn test_rate_limit_at_rest_stays_at_rest() {
        let next = rate_limit(Twist::ZERO, Twist::ZERO, &limits(), 0.01);
        assert!(next.is_zero());
    }

    #[test]
    fn test_unicycle_derivative() {
        let d = unicycle_derivative(Vec3::new(5.0, 5.0, PI / 2.0), Twist::new(2.0, 0.5));
        assert!(d.x.abs() < EPSILON);
        assert!((d.y - 2.0).abs() < EPSILON);
        assert!((d.z - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_rk4_matches_hand_computed_stages() {
        // dx/dt = x has the RK4 one-step factor 1 + h + h²/2 + h³/6 + h⁴/24.
        let h = 0.1;
        let next = rk4_step(Vec3::new(1.0, 2.0, -1.0), h, |s| s);
        let factor = 1.0 + h + h * h / 2.0 + h * h * h / 6.0 + h * h * h * h / 24.0;
        assert!((next.x - factor).abs() < 1e-12);
        assert!((next.y - 2.0 * factor).abs() < 1e-12);
        assert!((next.z + factor).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_straight_line() {
        let pose = Pose::new(1.0, 1.0, PI / 2.0);
        let next = integrate_pose(pose, Twist::new(1.0, 0.0), 2.0).unwrap();
        assert!((next.x - 1.0).abs() < EPSILON);
        assert!((next.y - 3.0).abs() < EPSILON);
        assert!((next.theta - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_integrate_follows_circular_arc() {
        let (v, w) = (1.0, 0.8);
        let dt = 0.01;
        let mut pose = Pose::new(0.0, 0.0, 0.3);
        for _ in 0..100 {
            pose = integrate_pose(pose, Twist::new(v, w), dt).unwrap();
        }
        // Closed form after t = 1 s
        let t = 1.0;
        let theta0: f64 = 0.3;
        let expected_x = v / w * ((theta0 + w * t).sin() - theta0.sin());
        let expected_y = -v / w * ((theta0 + w * t).cos() - theta0.cos());
        assert!((pose.x - expected_x).abs() < 1e-9);
        assert!((pose.y - expected_y).abs() < 1e-9);
        assert!((pose.theta - (theta0 + w * t)).abs() < 1e-9);
    }

    #[test]
    fn test_integrate_at_rest_is_exact() {
        let pose = Pose::new(0.25, -1.5, 1.0);
        let mut p = pose;
        for _ in 0..1000 {
            p = integrate_pose(p, Twist::ZERO, 0.01).unwrap();
        }
        assert_eq!(p, pose);
    }

    #[test]
    fn test_integrate_negative_dt() {
        let result = integrate_pose(Pose::default(), Twist::new(1.0, 0.0), -0.1);
        assert!(matches!(result, Err(KinematicsError::NegativeTimeDelta("must be non-negative"))));
    }
}
