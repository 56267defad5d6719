//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use tuner_common::prelude::*;` and get
//! the most important types without listing individual paths.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_BIND_ADDR, DEFAULT_PULSE_FREQUENCY_HZ, MAX_AXES};

// ─── Axes ───────────────────────────────────────────────────────────
pub use crate::axis::{default_axis_table, AxisConfig, AxisId, AxisPins};

// ─── GPIO ───────────────────────────────────────────────────────────
pub use crate::hal::{GpioBackend, HalError, Level, Pin};

// ─── Channel Protocol ───────────────────────────────────────────────
pub use crate::protocol::{Command, ProtocolError};
