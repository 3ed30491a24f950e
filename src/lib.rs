#![doc = "Single-robot 2D simulator."]
#![doc = ""]
#![doc = "A unicycle robot moves through a scene of line-segment walls under"]
#![doc = "acceleration-limited control. A background loop integrates its pose,"]
#![doc = "detects collisions and publishes noisy odometry and laser scans that"]
#![doc = "consumers poll through a [`SimLink`]."]

pub mod config;
pub mod error;
pub mod laser;
pub mod noise;
pub mod robot;
pub mod scene;
pub mod shared;
pub mod simulator;

pub use error::SimError;
pub use laser::{Laser, LaserConfig, LaserScan};
pub use robot::{Robot, RobotConfig, RobotState};
pub use scene::Scene;
pub use shared::{GroundTruth, OdometryData, SimLink};
pub use simulator::{SimConfig, SimOutcome, Simulator, SimulatorHandle, TickReport};

pub use robosim_geometry as geometry;
pub use robosim_kinematics as kinematics;
