//! # Tuner Motion Controller Binary
//!
//! Motor-side process: drives the tuning-capacitor steppers and reports
//! the encoder-confirmed position after every move.
//!
//! # Usage
//!
//! ```bash
//! # Sweep all four axes forever, -100 steps per move
//! tuner_motion
//!
//! # One bounded sweep of axis 2
//! tuner_motion --axis 2 --steps 250 --cycles 1
//!
//! # Reset all encoder positions to zero
//! tuner_motion --calibrate
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level as LogLevel};
use tracing_subscriber::EnvFilter;
use tuner_common::axis::AxisId;
use tuner_common::config::ConfigLoader;
use tuner_common::hal::{GpioBackend, Level};
use tuner_hal::registry::builtin_registry;
use tuner_motion::client::TrackerClient;
use tuner_motion::config::MotionConfig;
use tuner_motion::stepper::{default_motor_table, StepperMotor, MOTOR_RESET_PIN};

/// Tuner Motion Controller: stepper drive and position queries
#[derive(Parser, Debug)]
#[command(name = "tuner_motion")]
#[command(version)]
#[command(about = "Stepper motion controller with encoder position readback")]
struct Args {
    /// Path to motion configuration file (motion.toml).
    /// Compiled-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the tracker address from the config.
    #[arg(long, value_name = "ADDR")]
    connect: Option<String>,

    /// Override the GPIO backend from the config.
    #[arg(long, value_name = "NAME")]
    backend: Option<String>,

    /// Reset all encoder positions to zero and exit.
    #[arg(long)]
    calibrate: bool,

    /// Signed step count per move (sign selects direction).
    #[arg(long, default_value_t = -100, allow_hyphen_values = true)]
    steps: i64,

    /// Sweep a single axis instead of all of them.
    #[arg(long, value_name = "ID")]
    axis: Option<u8>,

    /// Number of sweep cycles; runs until interrupted when omitted.
    #[arg(long)]
    cycles: Option<u64>,

    /// Pause between moves in seconds.
    #[arg(long, default_value_t = 2)]
    pause_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Tuner Motion Controller v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        std::process::exit(1);
    }

    info!("Tuner Motion Controller shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {path:?}");
            MotionConfig::load(path)?
        }
        None => {
            info!("no config file given, using compiled-in defaults");
            MotionConfig::default()
        }
    };

    if let Some(connect) = &args.connect {
        config.connect_addr = connect.clone();
    }
    if let Some(backend) = &args.backend {
        config.backend = backend.clone();
    }
    config.validate()?;

    let client = TrackerClient::new(config.connect_addr.clone());

    if args.calibrate {
        info!("requesting calibration of all axes");
        client.calibrate()?;
        info!("all encoder positions reset to zero");
        return Ok(());
    }

    let registry = builtin_registry();
    let backend: Arc<dyn GpioBackend> = Arc::from(registry.create_backend(&config.backend)?);
    info!("using GPIO backend '{}'", backend.name());

    // Hold the shared driver-reset line high so the bridges stay active.
    backend.write(MOTOR_RESET_PIN, Level::High)?;

    let selected: Option<AxisId> = match args.axis {
        Some(raw) => Some(AxisId::new(raw).ok_or("axis id must be positive")?),
        None => None,
    };

    let motors: Vec<StepperMotor> = default_motor_table()
        .into_iter()
        .filter(|(id, _)| selected.is_none_or(|wanted| *id == wanted))
        .map(|(id, pins)| StepperMotor::new(id, pins, Arc::clone(&backend), &config))
        .collect::<Result<_, _>>()?;
    if motors.is_empty() {
        return Err(format!("no motor configured for axis {}", args.axis.unwrap_or(0)).into());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    sweep(args, &client, &motors, &running)
}

/// Move each selected motor, then ask the tracker where it actually
/// landed. A channel failure aborts the sweep rather than continuing on a
/// stale position.
fn sweep(
    args: &Args,
    client: &TrackerClient,
    motors: &[StepperMotor],
    running: &Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pause = Duration::from_secs(args.pause_secs);
    let mut cycle: u64 = 0;

    info!(
        "sweeping {} axes, {} steps per move",
        motors.len(),
        args.steps
    );

    while running.load(Ordering::SeqCst) {
        for motor in motors {
            if !running.load(Ordering::SeqCst) {
                break;
            }

            motor.move_steps(args.steps)?;
            let position = client.request_position(motor.id())?;
            info!("axis {} at {} pulses", motor.id(), position);

            std::thread::sleep(pause);
        }

        cycle += 1;
        if let Some(limit) = args.cycles {
            if cycle >= limit {
                info!("completed {cycle} sweep cycles");
                break;
            }
        }
    }

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        LogLevel::DEBUG
    } else {
        LogLevel::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
