//! In-memory simulation backend.
//!
//! Replaces real GPIO hardware for tests and bench bring-up. Input levels
//! are injected with [`SimGpio::set_input`], which fires any registered edge
//! listeners with the new level, the same contract a hardware backend
//! honors from its interrupt context. Output writes are recorded so tests
//! can assert on the pulse trains a driver produced.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::trace;
use tuner_common::hal::{EdgeListener, GpioBackend, HalError, Level, Pin};

/// Simulated GPIO controller.
///
/// All lines idle `Low` until written or injected. Levels and listeners sit
/// behind separate locks so a listener running during [`set_input`] can
/// still sample other pins via [`GpioBackend::read`].
pub struct SimGpio {
    levels: Mutex<HashMap<Pin, Level>>,
    listeners: Mutex<HashMap<Pin, Vec<EdgeListener>>>,
    writes: Mutex<HashMap<Pin, Vec<Level>>>,
}

impl SimGpio {
    /// Create a simulated controller with all lines low.
    pub fn new() -> Self {
        Self {
            levels: Mutex::new(HashMap::new()),
            listeners: Mutex::new(HashMap::new()),
            writes: Mutex::new(HashMap::new()),
        }
    }

    /// Inject a new level on an input pin.
    ///
    /// If the level differs from the pin's current level, every listener
    /// subscribed to the pin is invoked with the new level. Setting the
    /// same level twice is a no-op, matching edge-triggered hardware.
    pub fn set_input(&self, pin: Pin, level: Level) {
        {
            let mut levels = self.levels.lock().expect("levels lock poisoned");
            let previous = levels.insert(pin, level).unwrap_or(Level::Low);
            if previous == level {
                return;
            }
        }

        trace!("sim edge on pin {pin}: {level:?}");
        let listeners = self.listeners.lock().expect("listeners lock poisoned");
        if let Some(subscribed) = listeners.get(&pin) {
            for listener in subscribed {
                listener(level);
            }
        }
    }

    /// Every level ever written to an output pin, in order.
    pub fn writes(&self, pin: Pin) -> Vec<Level> {
        self.writes
            .lock()
            .expect("writes lock poisoned")
            .get(&pin)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of rising edges recorded on an output pin.
    pub fn rising_edges(&self, pin: Pin) -> usize {
        let writes = self.writes(pin);
        let mut count = 0;
        let mut previous = Level::Low;
        for level in writes {
            if level == Level::High && previous == Level::Low {
                count += 1;
            }
            previous = level;
        }
        count
    }
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioBackend for SimGpio {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn read(&self, pin: Pin) -> Result<Level, HalError> {
        let levels = self.levels.lock().expect("levels lock poisoned");
        Ok(levels.get(&pin).copied().unwrap_or(Level::Low))
    }

    fn write(&self, pin: Pin, level: Level) -> Result<(), HalError> {
        {
            let mut levels = self.levels.lock().expect("levels lock poisoned");
            levels.insert(pin, level);
        }
        let mut writes = self.writes.lock().expect("writes lock poisoned");
        writes.entry(pin).or_default().push(level);
        Ok(())
    }

    fn subscribe(&self, pin: Pin, listener: EdgeListener) -> Result<(), HalError> {
        let mut listeners = self.listeners.lock().expect("listeners lock poisoned");
        listeners.entry(pin).or_default().push(listener);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn lines_idle_low() {
        let gpio = SimGpio::new();
        assert_eq!(gpio.read(6).unwrap(), Level::Low);
    }

    #[test]
    fn set_input_fires_listener_with_new_level() {
        let gpio = SimGpio::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);

        gpio.subscribe(
            6,
            Box::new(move |level| {
                assert_eq!(level, Level::High);
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        gpio.set_input(6, Level::High);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(gpio.read(6).unwrap(), Level::High);
    }

    #[test]
    fn repeated_level_does_not_fire() {
        let gpio = SimGpio::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);

        gpio.subscribe(
            13,
            Box::new(move |_| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        gpio.set_input(13, Level::High);
        gpio.set_input(13, Level::High);
        gpio.set_input(13, Level::Low);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listener_can_read_other_pins() {
        let gpio = Arc::new(SimGpio::new());
        let observed = Arc::new(AtomicUsize::new(usize::MAX));

        let gpio_clone = Arc::clone(&gpio);
        let observed_clone = Arc::clone(&observed);
        gpio.subscribe(
            6,
            Box::new(move |_| {
                let b = gpio_clone.read(13).unwrap();
                observed_clone.store(b.is_high() as usize, Ordering::SeqCst);
            }),
        )
        .unwrap();

        gpio.set_input(13, Level::High);
        gpio.set_input(6, Level::High);
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn writes_are_recorded_in_order() {
        let gpio = SimGpio::new();
        gpio.write(17, Level::High).unwrap();
        gpio.write(17, Level::Low).unwrap();
        gpio.write(17, Level::High).unwrap();

        assert_eq!(gpio.writes(17), vec![Level::High, Level::Low, Level::High]);
        assert_eq!(gpio.rising_edges(17), 2);
    }
}
