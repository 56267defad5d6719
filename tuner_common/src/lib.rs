//! Tuner Common Library
//!
//! This crate provides the shared types, constants and wire protocol used by
//! all tuner workspace crates.
//!
//! # Module Structure
//!
//! - [`axis`] - Axis identity and static pin configuration
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants
//! - [`hal`] - GPIO backend trait and error types
//! - [`protocol`] - Channel protocol command/response codec
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use tuner_common::prelude::*;
//!
//! let cmd = Command::parse("2").unwrap();
//! assert_eq!(cmd, Command::Query(AxisId::new(2).unwrap()));
//! ```

pub mod axis;
pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod protocol;
