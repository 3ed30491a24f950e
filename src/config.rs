//! Application configuration.
//!
//! Values come from `config/default.toml` (optional) overridden by
//! `ROBOSIM_`-prefixed environment variables, with `__` separating nested keys:
//! `ROBOSIM_SIMULATION__TICK_MS=5`.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::simulator::SimConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "ROBOSIM";

/// Where the scene comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub path: PathBuf,
    /// Move the scene so its bounding box is centered on the origin.
    pub recenter: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scenes/room.scn"),
            recenter: true,
        }
    }
}

/// Speeds commanded by the keyboard teleop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    pub linear_speed: f64,
    pub angular_speed: f64,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            linear_speed: 0.5,
            angular_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Interval between telemetry log lines.
    pub period_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { period_ms: 1000 }
    }
}

/// Top-level configuration of the simulator binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub simulation: SimConfig,
    pub teleop: TeleopConfig,
    pub telemetry: TelemetryConfig,
}

/// Loads the configuration from `path` (if it exists) and the environment.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Parses configuration from TOML text alone.
pub fn parse_config(toml: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}
