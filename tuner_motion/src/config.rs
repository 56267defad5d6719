//! Motion TOML configuration.

use serde::Deserialize;
use std::time::Duration;
use tuner_common::config::{ConfigError, SharedConfig};
use tuner_common::consts::{DEFAULT_BIND_ADDR, DEFAULT_PULSE_FREQUENCY_HZ};

/// Configuration for the Motion Controller binary.
///
/// # TOML Example
///
/// ```toml
/// connect_addr = "127.0.0.1:65432"
/// pulse_frequency_hz = 80
/// backend = "sim"
///
/// [shared]
/// log_level = "info"
/// service_name = "tuner-motion"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MotionConfig {
    pub shared: SharedConfig,

    /// Address of the Position Tracker's query channel.
    #[serde(default = "default_connect_addr")]
    pub connect_addr: String,

    /// Step pulse frequency in Hz.
    #[serde(default = "default_pulse_frequency_hz")]
    pub pulse_frequency_hz: u32,

    /// GPIO backend name.
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_connect_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_pulse_frequency_hz() -> u32 {
    DEFAULT_PULSE_FREQUENCY_HZ
}

fn default_backend() -> String {
    "sim".to_string()
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: Default::default(),
                service_name: "tuner-motion".to_string(),
            },
            connect_addr: default_connect_addr(),
            pulse_frequency_hz: default_pulse_frequency_hz(),
            backend: default_backend(),
        }
    }
}

impl MotionConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if the connect address does
    /// not parse or the pulse frequency is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        self.connect_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                ConfigError::ValidationError(format!(
                    "bad connect_addr {:?}: {e}",
                    self.connect_addr
                ))
            })?;

        if self.pulse_frequency_hz == 0 {
            return Err(ConfigError::ValidationError(
                "pulse_frequency_hz must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// One full step pulse period.
    pub fn pulse_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.pulse_frequency_hz))
    }
}
