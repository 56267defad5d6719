//! # Tuner Position Tracker Binary
//!
//! Long-lived encoder-side process: decodes quadrature edges into per-axis
//! counters, persists them across restarts, and answers position queries
//! and the calibrate command over the point-to-point TCP channel.
//!
//! # Usage
//!
//! ```bash
//! # Run with compiled-in defaults and the simulation backend
//! tuner_tracker
//!
//! # Run with a config file and verbose logging
//! tuner_tracker --config config/tracker.toml -v
//!
//! # Override the listen address and snapshot location
//! tuner_tracker --bind 0.0.0.0:9100 --snapshot /var/lib/tuner/encoders.bin
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;
use tuner_common::axis::default_axis_table;
use tuner_common::config::ConfigLoader;
use tuner_common::hal::GpioBackend;
use tuner_hal::registry::builtin_registry;
use tuner_tracker::config::TrackerConfig;
use tuner_tracker::persist::SnapshotStore;
use tuner_tracker::server::TrackerServer;
use tuner_tracker::decoder;
use tuner_tracker::store::AxisStore;

/// Tuner Position Tracker: encoder counting and the position query channel
#[derive(Parser, Debug)]
#[command(name = "tuner_tracker")]
#[command(version)]
#[command(about = "Quadrature position tracker with persisted counters")]
struct Args {
    /// Path to tracker configuration file (tracker.toml).
    /// Compiled-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address from the config.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Override the snapshot file path from the config.
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Override the GPIO backend from the config.
    #[arg(long, value_name = "NAME")]
    backend: Option<String>,

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

    info!("Tuner Position Tracker v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        std::process::exit(1);
    }

    info!("Tuner Position Tracker shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {path:?}");
            TrackerConfig::load(path)?
        }
        None => {
            info!("no config file given, using compiled-in defaults");
            TrackerConfig::default()
        }
    };

    if let Some(bind) = &args.bind {
        config.bind_addr = bind.clone();
    }
    if let Some(snapshot) = &args.snapshot {
        config.snapshot_path = snapshot.clone();
    }
    if let Some(backend) = &args.backend {
        config.backend = backend.clone();
    }
    config.validate()?;

    // GPIO backend from the registry.
    let registry = builtin_registry();
    let backend: Arc<dyn GpioBackend> = Arc::from(registry.create_backend(&config.backend)?);
    info!("using GPIO backend '{}'", backend.name());

    // Restore counters from the snapshot, or fall back to the compiled-in
    // axis table at position zero.
    let snapshots = SnapshotStore::new(&config.snapshot_path);
    let store = match snapshots.load() {
        Some(snapshot) => Arc::new(AxisStore::from_snapshot(&snapshot)),
        None => {
            info!("starting from defaults, all positions zero");
            Arc::new(AxisStore::from_defaults(&default_axis_table()))
        }
    };
    for axis in store.axes() {
        info!("  axis {} at {} (A={} B={} X={})",
            axis.id(),
            axis.position(),
            axis.pins().channel_a,
            axis.pins().channel_b,
            axis.pins().index,
        );
    }

    // Arm edge listeners before opening the channel, so no pulse between
    // bind and subscribe is missed.
    decoder::attach(&store, &backend)?;

    let server = TrackerServer::bind(
        config.bind_addr.as_str(),
        store,
        snapshots,
        config.read_timeout(),
    )?;

    let running = server.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, std::sync::atomic::Ordering::SeqCst);
    })?;

    server.run()?;
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
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
