//! Backend registry for GPIO backends.
//!
//! Provides a `BackendRegistry` struct for registering and retrieving GPIO
//! backend factories. This uses constructor-injection rather than global
//! state.

use std::collections::HashMap;
use tuner_common::hal::{BackendFactory, GpioBackend, HalError};

/// Registry of available GPIO backends.
///
/// Constructed at startup, populated via `register()`, and passed to the
/// binaries by value. No global state, so it is testable in isolation.
pub struct BackendRegistry {
    factories: HashMap<&'static str, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory.
    ///
    /// # Panics
    /// Panics if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: BackendFactory) {
        if self.factories.contains_key(name) {
            panic!("Backend '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a backend factory by name.
    pub fn get_factory(&self, name: &str) -> Option<BackendFactory> {
        self.factories.get(name).copied()
    }

    /// Create a backend instance by name.
    ///
    /// # Errors
    /// Returns `HalError::BackendNotFound` if no backend with the given
    /// name is registered.
    pub fn create_backend(&self, name: &str) -> Result<Box<dyn GpioBackend>, HalError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| HalError::BackendNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// List all registered backend names.
    pub fn list_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry pre-populated with all built-in backends.
pub fn builtin_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register("sim", || Box::new(crate::sim::SimGpio::new()));
    registry
}
