//! Fixed-rate simulation loop.
//!
//! A [`Simulator`] owns the robot, the laser and the obstacle set. Each tick it
//! may run a control update and a laser scan, publishing the results into the
//! shared cells read through [`SimLink`]. Construction never spawns a thread;
//! [`Simulator::start`] does, and returns a [`SimulatorHandle`].

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use robosim_geometry::Obstacle;
use robosim_kinematics::Pose;
use serde::{Deserialize, Serialize};
use spin_sleep::SpinSleeper;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::laser::{Laser, LaserConfig, LaserScan};
use crate::noise::NoiseGenerator;
use crate::robot::{Robot, RobotConfig, RobotState};
use crate::scene::Scene;
use crate::shared::{GroundTruth, OdometryData, SharedState, SimLink, now_millis};

/// Timing, noise seed and model parameters of one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Duration of one loop iteration in milliseconds.
    pub tick_ms: u64,
    /// Control updates run every `control_divisor` ticks.
    pub control_divisor: u64,
    /// Laser scans run every `sensor_divisor` ticks.
    pub sensor_divisor: u64,
    /// Noise seed; 0 draws from OS entropy.
    pub seed: u64,
    pub robot: RobotConfig,
    pub laser: LaserConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            control_divisor: 1,
            sensor_divisor: 10,
            seed: 0,
            robot: RobotConfig::default(),
            laser: LaserConfig::default(),
        }
    }
}

impl SimConfig {
    /// Checks timing and model parameters.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.tick_ms == 0 {
            return Err(SimError::InvalidConfig("simulation.tick_ms must be positive"));
        }
        if self.control_divisor == 0 {
            return Err(SimError::InvalidConfig(
                "simulation.control_divisor must be positive",
            ));
        }
        if self.sensor_divisor == 0 {
            return Err(SimError::InvalidConfig(
                "simulation.sensor_divisor must be positive",
            ));
        }
        self.robot.validate()?;
        self.laser.validate()
    }

    /// Wall-clock duration of one tick.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Simulated seconds covered by one control update.
    pub fn control_dt(&self) -> f64 {
        1e-3 * (self.tick_ms * self.control_divisor) as f64
    }
}

/// What a single call to [`Simulator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickReport {
    /// The tick ran and the robot is still running.
    Running {
        tick: u64,
        /// A control update ran.
        controlled: bool,
        /// A laser scan was published.
        sensed: bool,
    },
    /// The control update of this tick ended in a collision.
    Crashed { tick: u64, pose: Pose },
    /// The robot had already crashed; nothing happened.
    Halted,
}

/// Why the simulation loop exited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimOutcome {
    /// The robot hit an obstacle on `tick`.
    Crashed { tick: u64, pose: Pose },
    /// A stop was requested before `tick` ran.
    Stopped { tick: u64 },
}

/// Single-robot simulator.
#[derive(Debug)]
pub struct Simulator {
    config: SimConfig,
    robot: Robot,
    laser: Laser,
    obstacles: Vec<Obstacle>,
    noise: NoiseGenerator,
    shared: Arc<SharedState>,
    tick: u64,
    crashed_at: Option<u64>,
}

impl Simulator {
    /// Build a simulator from scene data. No thread is spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the scene has no
    /// obstacles, or the robot pose or length is unusable.
    pub fn new(scene: Scene, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        if scene.obstacles.is_empty() {
            return Err(SimError::NoObstacles);
        }
        let robot = Robot::new(scene.pose, scene.robot_length, &config.robot)?;
        let laser = Laser::new(config.laser.clone())?;
        if robot.collides(&scene.obstacles) {
            warn!(pose = %scene.pose, "Robot starts inside an obstacle and will crash on its first control tick");
        }

        let shared = Arc::new(SharedState::new(scene.pose, laser.invalid_measurement()));
        info!(
            obstacles = scene.obstacles.len(),
            pose = %scene.pose,
            tick_ms = config.tick_ms,
            control_divisor = config.control_divisor,
            sensor_divisor = config.sensor_divisor,
            "Simulator created"
        );

        Ok(Self {
            noise: NoiseGenerator::new(config.seed),
            config,
            robot,
            laser,
            obstacles: scene.obstacles,
            shared,
            tick: 0,
            crashed_at: None,
        })
    }

    /// Handle on the shared cells.
    pub fn link(&self) -> SimLink {
        SimLink::new(Arc::clone(&self.shared))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Number of ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// True pose.
    pub fn pose(&self) -> Pose {
        self.robot.pose()
    }

    pub fn state(&self) -> RobotState {
        self.robot.state()
    }

    /// Runs one tick without sleeping.
    pub fn step(&mut self) -> TickReport {
        if self.robot.is_crashed() {
            return TickReport::Halted;
        }

        let tick = self.tick;
        self.tick += 1;

        let controlled = tick % self.config.control_divisor == 0;
        if controlled {
            let goal = self.shared.goal_control.snapshot();
            let update = self.robot.control_tick(
                goal,
                self.config.control_dt(),
                &self.obstacles,
                &mut self.noise,
            );
            let timestamp_ms = now_millis();
            self.shared.current_control.publish(update.control);
            self.shared.odometry.publish(OdometryData {
                control: update.control,
                timestamp_ms,
                tick,
            });
            self.shared.ground_truth.publish(GroundTruth {
                pose: update.pose,
                timestamp_ms,
                tick,
            });

            if update.state == RobotState::Crashed {
                self.crashed_at = Some(tick);
                self.shared.running.store(false, Ordering::Release);
                return TickReport::Crashed {
                    tick,
                    pose: update.pose,
                };
            }
        }

        let sensed = tick % self.config.sensor_divisor == 0;
        if sensed {
            let ranges = self.laser.scan(
                self.robot.sensor_origin(),
                self.robot.pose().theta,
                &self.obstacles,
                &mut self.noise,
            );
            let scan = LaserScan {
                ranges,
                invalid_measurement: self.laser.invalid_measurement(),
                timestamp_ms: now_millis(),
                tick,
            };
            debug!(tick, valid = scan.valid_count(), "laser scan");
            self.shared.laser_scan.publish(scan);
        }

        TickReport::Running {
            tick,
            controlled,
            sensed,
        }
    }

    /// Runs ticks at the configured rate until the robot crashes or a stop is
    /// requested.
    ///
    /// A tick that overruns its slot is logged and the schedule restarts from
    /// the current time.
    pub fn run(mut self) -> SimOutcome {
        let period = self.config.tick();
        let sleeper = SpinSleeper::new(10_000);
        let mut deadline = Instant::now();
        info!(tick_ms = self.config.tick_ms, "Simulation loop started");

        let outcome = loop {
            if self.shared.stop_requested.load(Ordering::Acquire) {
                break SimOutcome::Stopped { tick: self.tick };
            }
            match self.step() {
                TickReport::Running { .. } => {}
                TickReport::Crashed { tick, pose } => break SimOutcome::Crashed { tick, pose },
                TickReport::Halted => {
                    break SimOutcome::Crashed {
                        tick: self.crashed_at.unwrap_or(self.tick),
                        pose: self.robot.pose(),
                    };
                }
            }

            deadline += period;
            let now = Instant::now();
            if deadline > now {
                sleeper.sleep(deadline - now);
            } else {
                warn!(tick = self.tick, behind = ?(now - deadline), "Simulation tick overran its slot");
                deadline = now;
            }
        };

        self.shared.running.store(false, Ordering::Release);
        match outcome {
            SimOutcome::Crashed { tick, pose } => {
                info!(tick, pose = %pose, "Robot: \"Oh no! I crashed!\" Simulation loop finished")
            }
            SimOutcome::Stopped { tick } => info!(tick, "Simulation loop stopped on request"),
        }
        outcome
    }

    /// Spawns the simulation loop on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns `Err(SimError::Spawn)` if the OS refuses to create the thread.
    pub fn start(self) -> Result<SimulatorHandle, SimError> {
        let link = self.link();
        let thread = std::thread::Builder::new()
            .name("simulation".into())
            .spawn(move || self.run())
            .map_err(SimError::Spawn)?;
        info!("Simulation thread spawned");
        Ok(SimulatorHandle {
            link,
            thread: Some(thread),
        })
    }
}

/// Owner of a running simulation thread.
///
/// Dropping the handle requests a stop and detaches the thread.
#[derive(Debug)]
pub struct SimulatorHandle {
    link: SimLink,
    thread: Option<JoinHandle<SimOutcome>>,
}

impl SimulatorHandle {
    pub fn link(&self) -> SimLink {
        self.link.clone()
    }

    /// Asks the loop to exit before its next tick.
    pub fn stop(&self) {
        self.link.request_stop();
    }

    /// Returns true once the simulation thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .is_none_or(|thread| thread.is_finished())
    }

    /// Waits for the loop to exit and returns its outcome.
    ///
    /// This does not request a stop; call [`SimulatorHandle::stop`] first
    /// unless the robot is expected to crash.
    pub fn join(mut self) -> Result<SimOutcome, SimError> {
        let thread = self.thread.take().ok_or(SimError::ThreadPanicked)?;
        thread.join().map_err(|_| SimError::ThreadPanicked)
    }
}

impl Drop for SimulatorHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.link.request_stop();
        }
    }
}
