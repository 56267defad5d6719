//! GPIO backend trait and error types.
//!
//! This module defines:
//! - `GpioBackend` trait - Interface for pluggable GPIO backends
//! - `HalError` enum - Error types for GPIO operations
//! - `BackendFactory` type alias - Factory function type
//! - `Level` / `Pin` - Digital line primitives
//!
//! The tracker and the motion controller both talk to hardware exclusively
//! through this trait, so tests and bench bring-up can run against the
//! in-memory simulation backend in `tuner_hal`.

use thiserror::Error;

/// A digital line number (BCM numbering on the reference hardware).
pub type Pin = u8;

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// The opposite level.
    #[inline]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// Error types for GPIO operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Backend initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Backend not found in the registry
    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    /// Pin is not known to the backend
    #[error("Unknown pin: {0}")]
    UnknownPin(Pin),

    /// Underlying device access failed
    #[error("Device access error: {0}")]
    DeviceError(String),
}

/// Callback invoked with the new level on every transition of a subscribed pin.
pub type EdgeListener = Box<dyn Fn(Level) + Send + Sync>;

/// Factory function type for creating backend instances.
pub type BackendFactory = fn() -> Box<dyn GpioBackend>;

/// Trait defining the interface for GPIO backends.
///
/// Backends own the platform mechanism behind each operation (character
/// device, memory-mapped registers, or pure simulation). Edge delivery is
/// the backend's responsibility: listeners registered via [`subscribe`]
/// must be invoked with the *new* level of the pin on every transition,
/// from whatever interrupt or polling context the platform provides.
///
/// [`subscribe`]: GpioBackend::subscribe
pub trait GpioBackend: Send + Sync {
    /// Returns the backend's unique identifier (e.g., "sim").
    fn name(&self) -> &'static str;

    /// Read the current level of an input pin.
    ///
    /// Edge listeners call this to sample a *different* pin at the instant
    /// of a transition, so implementations must not return stale values.
    ///
    /// # Errors
    /// Returns `HalError::UnknownPin` if the pin is not configured.
    fn read(&self, pin: Pin) -> Result<Level, HalError>;

    /// Drive an output pin to the given level.
    ///
    /// # Errors
    /// Returns `HalError::DeviceError` if the line cannot be driven.
    fn write(&self, pin: Pin, level: Level) -> Result<(), HalError>;

    /// Register an edge listener on an input pin.
    ///
    /// The listener is invoked with the new level on both rising and
    /// falling transitions. Multiple listeners per pin are allowed.
    ///
    /// # Errors
    /// Returns `HalError::InitFailed` if edge detection cannot be armed.
    fn subscribe(&self, pin: Pin, listener: EdgeListener) -> Result<(), HalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_helpers() {
        assert!(Level::High.is_high());
        assert!(!Level::Low.is_high());
        assert_eq!(Level::Low.toggled(), Level::High);
        assert_eq!(Level::High.toggled(), Level::Low);
    }

    #[test]
    fn hal_error_display() {
        let err = HalError::BackendNotFound("gpiochip0".to_string());
        assert!(err.to_string().contains("gpiochip0"));

        let err = HalError::UnknownPin(42);
        assert!(err.to_string().contains("42"));
    }
}
