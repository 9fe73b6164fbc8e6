//! # HMI Agent
//!
//! Reads joystick frames, maps them to swerve drivetrain commands, and
//! publishes `hmi_signals` (plus `reset_heading` odometry on a reset press)
//! as newline-delimited JSON.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Parse arguments, load and validate configuration
//!    - Set up logging (stderr, plus daily rolling files when `log_dir` is set)
//!    - Open the output sink and start the input source
//!
//! 2. **Main Loop**
//!    - Map every frame and publish the result
//!    - Substitute frames when input goes stale
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C or end of input stops the loop
//!    - Log total frame counts

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hmi_agent::config::{Config, InputSourceKind};
use hmi_agent::control_loop::ControlLoop;
use hmi_agent::input::{evdev_source, stream, INPUT_QUEUE_CAPACITY};
use hmi_agent::output::Publisher;

/// Configuration file used when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "config/hmi_agent.toml";

/// HMI Agent - Map joystick input to swerve drivetrain commands
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file [default: config/hmi_agent.toml, if present]
    #[arg(short, long)]
    config: Option<String>,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(short, long, env = "HMI_AGENT_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config_path, config) = load_config(args.config.as_deref())?;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let _guard = init_logging(level, &config.logging.log_dir)?;

    info!("HMI Agent v{} starting...", env!("CARGO_PKG_VERSION"));
    match config_path {
        Some(path) => info!("Configuration file: {}", path),
        None => warn!(
            "Configuration file {} not found, using defaults (all controls unbound)",
            DEFAULT_CONFIG_PATH
        ),
    }

    let publisher = Publisher::open(&config.output).await?;
    let (tx, rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);

    match config.input.source {
        InputSourceKind::Stream => {
            let handle = stream::spawn(&config.input, tx).await?;
            tokio::spawn(async move {
                match handle.await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => error!("Input stream failed: {}", e),
                    Err(e) => error!("Input stream task panicked: {}", e),
                }
            });
        }
        InputSourceKind::Evdev => {
            let device = evdev_source::open(&config.input)?;
            config
                .drive
                .validate_bindings(device.axis_count(), device.button_count())?;
            info!("Joystick opened at: {}", device.device_path());
            // Reader thread exits on its own once the loop drops the receiver
            let _reader = device.spawn_reader(&config.input, tx)?;
        }
    }

    info!("Press Ctrl+C to exit");

    let control = ControlLoop::new(&config, publisher);
    let stats = control.run(rx, shutdown_signal()).await;

    info!(
        "HMI Agent stopped after {} frames ({} resets)",
        stats.frames, stats.resets
    );

    Ok(())
}

/// Loads the configuration named on the command line, or the default file.
///
/// Only the default path may be missing; an explicit path that cannot be
/// loaded is an error. Returns the path actually used, if any.
fn load_config(explicit: Option<&str>) -> Result<(Option<String>, Config)> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => DEFAULT_CONFIG_PATH,
        None => return Ok((None, Config::default())),
    };

    let config = Config::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;
    Ok((Some(path.to_string()), config))
}

/// Completes on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}

/// Logs to stderr (stdout carries published messages) and, when `log_dir`
/// is set, to daily rolling files. The returned guard flushes the file
/// writer on drop.
fn init_logging(level: &str, log_dir: &str) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level")?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    if log_dir.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "hmi-agent.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(Some(guard))
}
