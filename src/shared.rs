//! Lock-protected snapshot cells shared between the simulation thread and
//! external consumers.
//!
//! Every cell has its own lock. Readers copy the value out and writers replace
//! it wholesale, so no code path ever holds two cell locks at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use robosim_kinematics::{Pose, Twist};
use serde::Serialize;
use tracing::warn;

use crate::laser::LaserScan;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// A single value behind its own read-write lock.
#[derive(Debug, Default)]
pub struct SharedCell<T> {
    value: RwLock<T>,
}

impl<T: Clone> SharedCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Copy of the last published value.
    pub fn snapshot(&self) -> T {
        self.value.read().clone()
    }

    /// Replaces the value.
    pub fn publish(&self, value: T) {
        *self.value.write() = value;
    }
}

/// Control applied on the last control tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OdometryData {
    /// Rate-limited, noise-free control.
    pub control: Twist,
    /// Wall-clock publish time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Simulation tick that produced it.
    pub tick: u64,
}

/// True pose, published for visualization and evaluation only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GroundTruth {
    pub pose: Pose,
    pub timestamp_ms: u64,
    pub tick: u64,
}

/// Cells owned by one simulator instance.
#[derive(Debug)]
pub(crate) struct SharedState {
    pub(crate) goal_control: SharedCell<Twist>,
    pub(crate) current_control: SharedCell<Twist>,
    pub(crate) odometry: SharedCell<OdometryData>,
    pub(crate) laser_scan: SharedCell<LaserScan>,
    pub(crate) ground_truth: SharedCell<GroundTruth>,
    pub(crate) running: AtomicBool,
    pub(crate) stop_requested: AtomicBool,
}

impl SharedState {
    pub(crate) fn new(pose: Pose, invalid_measurement: f64) -> Self {
        Self {
            goal_control: SharedCell::new(Twist::ZERO),
            current_control: SharedCell::new(Twist::ZERO),
            odometry: SharedCell::new(OdometryData::default()),
            laser_scan: SharedCell::new(LaserScan::empty(invalid_measurement)),
            ground_truth: SharedCell::new(GroundTruth {
                pose,
                ..GroundTruth::default()
            }),
            running: AtomicBool::new(true),
            stop_requested: AtomicBool::new(false),
        }
    }
}

/// Cloneable handle for issuing controls and reading snapshots.
///
/// Every method touches exactly one cell and never waits for fresher data.
#[derive(Debug, Clone)]
pub struct SimLink {
    shared: Arc<SharedState>,
}

impl SimLink {
    pub(crate) fn new(shared: Arc<SharedState>) -> Self {
        Self { shared }
    }

    /// Sets the goal control picked up by the next control tick.
    ///
    /// Non-finite values are dropped and the previous goal is kept.
    pub fn send_control(&self, linear: f64, angular: f64) {
        let goal = Twist::new(linear, angular);
        if !goal.is_finite() {
            warn!(linear, angular, "Dropping non-finite control command");
            return;
        }
        self.shared.goal_control.publish(goal);
    }

    /// Last requested goal control.
    pub fn goal_control(&self) -> Twist {
        self.shared.goal_control.snapshot()
    }

    /// Rate-limited control currently in effect.
    pub fn current_control(&self) -> Twist {
        self.shared.current_control.snapshot()
    }

    /// Last published odometry.
    pub fn odometry(&self) -> OdometryData {
        self.shared.odometry.snapshot()
    }

    /// Last published laser scan.
    pub fn laser_scan(&self) -> LaserScan {
        self.shared.laser_scan.snapshot()
    }

    /// Last published true pose.
    pub fn ground_truth(&self) -> GroundTruth {
        self.shared.ground_truth.snapshot()
    }

    /// Returns false once the robot crashed or the loop stopped.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Asks the simulation loop to exit after the current tick.
    pub fn request_stop(&self) {
        self.shared.stop_requested.store(true, Ordering::Release);
    }
}
