//! # Server Configuration
//!
//! Loaded once at startup from a TOML file. Every section is optional;
//! an empty file yields the defaults.
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0:5000"
//! worker_threads = 10
//!
//! [physics]
//! base_reaction_time = 1.0
//! low_speed_threshold = 5.0
//! meters_per_degree = 111000.0
//! bike_deceleration = 6.0
//! car_deceleration = 7.0
//!
//! [modes]
//! system_mode = "INDOOR"
//! control_mode = "HUMAN"
//!
//! [simulation]
//! device_count = 5
//! seed = 42
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use vigil_core::{CollisionTracker, ControlMode, PhysicsConfig, SystemMode};

use crate::simulation::SimulationConfig;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed values are out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Network settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_address: SocketAddr,
    /// Request-handling worker threads.
    pub worker_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            worker_threads: 10,
        }
    }
}

/// Initial mode settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModesConfig {
    /// Distance metric at startup.
    pub system_mode: SystemMode,
    /// Control mode at startup.
    pub control_mode: ControlMode,
}

/// Complete server configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    /// `[server]` section.
    pub server: ServerConfig,
    /// `[physics]` section.
    pub physics: PhysicsConfig,
    /// `[modes]` section.
    pub modes: ModesConfig,
    /// `[simulation]` section.
    pub simulation: SimulationConfig,
}

impl VigilConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "server.worker_threads must be at least 1".to_owned(),
            ));
        }
        self.physics.validate().map_err(ConfigError::Invalid)
    }

    /// Builds a tracker with this configuration's physics and initial modes.
    #[must_use]
    pub fn build_tracker(&self) -> CollisionTracker {
        CollisionTracker::with_config(
            self.physics,
            self.modes.system_mode,
            self.modes.control_mode,
        )
    }
}
