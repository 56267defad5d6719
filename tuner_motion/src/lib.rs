//! # Tuner Motion Controller Library
//!
//! Motor-side counterpart of the Position Tracker: drives each stepper
//! axis open-loop for a requested signed step count, then fetches the
//! resulting encoder position over the channel protocol to report back.
//!
//! ## Module Structure
//!
//! - [`client`] - Position Tracker client stub
//! - [`config`] - Motion TOML configuration
//! - [`stepper`] - DIR/STEP/EN pulse-train driver

pub mod client;
pub mod config;
pub mod stepper;

// Re-export key types for convenience
pub use crate::client::{ClientError, TrackerClient};
pub use crate::config::MotionConfig;
pub use crate::stepper::{default_motor_table, MotorPins, StepperMotor};
