//! Tracker TOML configuration.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tuner_common::config::{ConfigError, SharedConfig};
use tuner_common::consts::{DEFAULT_BIND_ADDR, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SNAPSHOT_FILE};

/// Configuration for the Position Tracker binary.
///
/// # TOML Example
///
/// ```toml
/// bind_addr = "127.0.0.1:65432"
/// snapshot_path = "/var/lib/tuner/encoders.bin"
/// read_timeout_ms = 2000
/// backend = "sim"
///
/// [shared]
/// log_level = "info"
/// service_name = "tuner-tracker"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    pub shared: SharedConfig,

    /// Address the query channel listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Snapshot file for persisted positions.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Per-connection read timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// GPIO backend name.
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_FILE)
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_backend() -> String {
    "sim".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: Default::default(),
                service_name: "tuner-tracker".to_string(),
            },
            bind_addr: default_bind_addr(),
            snapshot_path: default_snapshot_path(),
            read_timeout_ms: default_read_timeout_ms(),
            backend: default_backend(),
        }
    }
}

impl TrackerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if the bind address does not
    /// parse or the read timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                ConfigError::ValidationError(format!("bad bind_addr {:?}: {e}", self.bind_addr))
            })?;

        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "read_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
