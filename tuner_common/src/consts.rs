//! System-wide constants for the tuner workspace.
//!
//! Single source of truth for numeric limits and default paths.
//! Imported by all crates; no duplication permitted.

/// Number of actuated axes on the reference hardware (one per tuning capacitor).
pub const MAX_AXES: usize = 4;

/// Default address the Position Tracker listens on and the Motion
/// Controller connects to. Point-to-point on the loopback interface.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:65432";

/// Default snapshot file for persisted encoder positions.
pub const DEFAULT_SNAPSHOT_FILE: &str = "encoders.bin";

/// Default step pulse frequency in Hz.
///
/// 80 Hz suits the 200 ppr encoder resolution of the reference hardware.
pub const DEFAULT_PULSE_FREQUENCY_HZ: u32 = 80;

/// Default per-connection read timeout in milliseconds.
///
/// A client that connects but never sends a command is dropped after this
/// long so it cannot stall the sequential accept loop.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;
