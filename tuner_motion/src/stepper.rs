//! DIR/STEP/EN pulse-train driver.
//!
//! Open-loop by design: a move drives the step line as a 50 % square wave
//! at the configured pulse frequency for a duration derived from the step
//! count, with no closed-loop step verification. The encoder process is
//! the authority on where the axis actually ended up.

use crate::config::MotionConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tuner_common::axis::AxisId;
use tuner_common::consts::MAX_AXES;
use tuner_common::hal::{GpioBackend, HalError, Level, Pin};

/// Driver output line assignments for one motor (BCM numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorPins {
    /// Direction select output.
    pub dir: Pin,
    /// Step pulse output.
    pub step: Pin,
    /// H-bridge enable output, active low.
    pub enable: Pin,
}

/// Reset line shared by all motor drivers; held high to keep the bridges
/// out of reset.
pub const MOTOR_RESET_PIN: Pin = 2;

/// Compiled-in default motor table for the reference hardware, indexed by
/// axis id.
pub fn default_motor_table() -> Vec<(AxisId, MotorPins)> {
    const PINS: [(u8, u8, u8); MAX_AXES] = [
        (27, 17, 15),
        (10, 22, 18),
        (11, 9, 23),
        (5, 0, 24),
    ];

    PINS.iter()
        .enumerate()
        .map(|(idx, &(dir, step, enable))| {
            (
                AxisId::new(idx as u8 + 1).unwrap(),
                MotorPins { dir, step, enable },
            )
        })
        .collect()
}

/// One stepper axis behind a GPIO backend.
pub struct StepperMotor {
    id: AxisId,
    pins: MotorPins,
    backend: Arc<dyn GpioBackend>,
    pulse_period: Duration,
}

impl StepperMotor {
    /// Create a motor and park its driver: bridge disabled, step line low.
    ///
    /// # Errors
    /// Returns the backend's error if the output lines cannot be driven.
    pub fn new(
        id: AxisId,
        pins: MotorPins,
        backend: Arc<dyn GpioBackend>,
        config: &MotionConfig,
    ) -> Result<Self, HalError> {
        backend.write(pins.enable, Level::High)?;
        backend.write(pins.step, Level::Low)?;

        Ok(Self {
            id,
            pins,
            backend,
            pulse_period: config.pulse_period(),
        })
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    /// Drive the axis for a signed step count.
    ///
    /// Positive counts run one electrical direction (DIR low), negative
    /// the other (DIR high); the magnitude sets how long the pulse train
    /// runs: `|steps| * pulse_period * 2`, two edges per logical step.
    /// The enable line is asserted for the duration of the move and
    /// released afterward, also on the error path.
    ///
    /// # Errors
    /// Returns the backend's error if any output line cannot be driven.
    pub fn move_steps(&self, steps: i64) -> Result<(), HalError> {
        if steps == 0 {
            debug!("axis {}: zero-step move, nothing to do", self.id);
            return Ok(());
        }

        let dir_level = if steps > 0 { Level::Low } else { Level::High };
        self.backend.write(self.pins.dir, dir_level)?;
        self.backend.write(self.pins.enable, Level::Low)?;

        info!("axis {}: moving {} steps", self.id, steps);
        let result = self.drive_pulses(steps.unsigned_abs().saturating_mul(2));

        // Release the bridge no matter how the pulse train ended.
        let disable = self.backend.write(self.pins.enable, Level::High);
        result.and(disable)
    }

    /// Emit `pulses` full periods on the step line.
    fn drive_pulses(&self, pulses: u64) -> Result<(), HalError> {
        let half_period = self.pulse_period / 2;
        for _ in 0..pulses {
            self.backend.write(self.pins.step, Level::High)?;
            std::thread::sleep(half_period);
            self.backend.write(self.pins.step, Level::Low)?;
            std::thread::sleep(half_period);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_hal::sim::SimGpio;

    fn fast_config() -> MotionConfig {
        // High pulse rate so tests spend microseconds, not seconds.
        MotionConfig {
            pulse_frequency_hz: 50_000,
            ..Default::default()
        }
    }

    fn motor_on(gpio: &Arc<SimGpio>) -> StepperMotor {
        let backend: Arc<dyn GpioBackend> = Arc::clone(gpio) as Arc<dyn GpioBackend>;
        let (id, pins) = default_motor_table()[0];
        StepperMotor::new(id, pins, backend, &fast_config()).unwrap()
    }

    #[test]
    fn default_table_covers_all_axes_uniquely() {
        let table = default_motor_table();
        assert_eq!(table.len(), MAX_AXES);

        let mut pins = std::collections::HashSet::new();
        for (_, motor) in &table {
            for pin in [motor.dir, motor.step, motor.enable] {
                assert!(pins.insert(pin), "pin {pin} assigned twice");
            }
        }
    }

    #[test]
    fn new_parks_the_driver() {
        let gpio = Arc::new(SimGpio::new());
        let motor = motor_on(&gpio);

        assert_eq!(gpio.read(motor.pins.enable).unwrap(), Level::High);
        assert_eq!(gpio.read(motor.pins.step).unwrap(), Level::Low);
    }

    #[test]
    fn positive_move_drives_dir_low_and_two_pulses_per_step() {
        let gpio = Arc::new(SimGpio::new());
        let motor = motor_on(&gpio);

        motor.move_steps(3).unwrap();

        assert_eq!(gpio.read(motor.pins.dir).unwrap(), Level::Low);
        assert_eq!(gpio.rising_edges(motor.pins.step), 6);
        // Bridge released after the move.
        assert_eq!(gpio.read(motor.pins.enable).unwrap(), Level::High);
    }

    #[test]
    fn negative_move_drives_dir_high() {
        let gpio = Arc::new(SimGpio::new());
        let motor = motor_on(&gpio);

        motor.move_steps(-2).unwrap();

        assert_eq!(gpio.read(motor.pins.dir).unwrap(), Level::High);
        assert_eq!(gpio.rising_edges(motor.pins.step), 4);
    }

    #[test]
    fn enable_is_asserted_only_while_moving() {
        let gpio = Arc::new(SimGpio::new());
        let motor = motor_on(&gpio);

        motor.move_steps(1).unwrap();

        // Write history on the enable pin: parked high, asserted low for
        // the move, released high.
        assert_eq!(
            gpio.writes(motor.pins.enable),
            vec![Level::High, Level::Low, Level::High]
        );
    }

    #[test]
    fn zero_steps_is_a_no_op() {
        let gpio = Arc::new(SimGpio::new());
        let motor = motor_on(&gpio);

        motor.move_steps(0).unwrap();
        assert_eq!(gpio.rising_edges(motor.pins.step), 0);
        assert_eq!(gpio.writes(motor.pins.enable), vec![Level::High]);
    }
}
