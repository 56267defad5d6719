//! Error types for the Position Tracker.

use thiserror::Error;
use tuner_common::config::ConfigError;
use tuner_common::hal::HalError;
use tuner_common::protocol::ProtocolError;

/// Errors that can occur while running the tracker service.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Snapshot could not be written or removed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Channel socket operation failed.
    #[error("Channel I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Request token violated the protocol.
    #[error("Protocol error: {source}")]
    Protocol {
        #[from]
        source: ProtocolError,
    },

    /// GPIO backend operation failed.
    #[error("Hardware error: {source}")]
    Hal {
        #[from]
        source: HalError,
    },

    /// Configuration loading or validation failed.
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
