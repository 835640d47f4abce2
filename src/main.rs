// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! SentryCam - Camera Intrusion Watch
//!
//! Runs the detection loop in the background and serves start/stop/status/logs
//! commands over a WebSocket control channel.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;
use std::path::PathBuf;

use sentrycam::{Collaborators, Config, Engine, VERSION};
use sentrycam::streaming::ControlServer;

/// SentryCam - Camera Intrusion Watch
#[derive(Parser, Debug)]
#[command(name = "sentrycam")]
#[command(author = "SentryCam Project")]
#[command(version = VERSION)]
#[command(about = "Background intrusion detection with pollable status and event log")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with a simulated detector
    #[arg(long)]
    demo: bool,

    /// Start detecting immediately instead of waiting for a start command
    #[arg(long)]
    start: bool,

    /// Detection loop period in milliseconds
    #[arg(long)]
    period_ms: Option<u64>,

    /// Inference service URL
    #[arg(long)]
    detector_url: Option<String>,

    /// Control server port
    #[arg(long)]
    ws_port: Option<u16>,

    /// Disable the control server
    #[arg(long)]
    no_server: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Initialize logging
    let forced_level = if args.trace {
        Some("trace")
    } else if args.debug {
        Some("debug")
    } else {
        None
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(config.log_filter(forced_level))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("SentryCam v{} - Camera Intrusion Watch", VERSION);

    // Override with command line args
    if args.demo {
        config.demo_mode = true;
    }
    if args.start {
        config.detection.start_on_launch = true;
    }
    if let Some(period_ms) = args.period_ms {
        config.detection.period_ms = period_ms;
    }
    if let Some(url) = args.detector_url {
        config.detection.remote_url = Some(url);
    }
    if let Some(port) = args.ws_port {
        config.streaming.websocket_port = port;
    }
    if args.no_server {
        config.streaming.websocket_enabled = false;
    }
    config.validate()?;

    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    let collaborators = Collaborators::from_config(&config)?;
    let engine = Engine::new(config, collaborators);
    let worker = engine.spawn()?;

    if engine.config.streaming.websocket_enabled {
        let server = ControlServer::new(&engine.config.streaming, engine.control());
        server.start(engine.subscribe_shutdown()).await?;
    } else {
        warn!("Control server disabled; detection state is only visible in logs");
    }

    info!(
        "SentryCam running (detection {})",
        if engine.state().is_running() { "active" } else { "idle, waiting for start" }
    );
    info!("   Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, cleaning up...");
    engine.shutdown();
    if let Err(e) = worker.await {
        warn!("Detection loop task ended abnormally: {}", e);
    }

    let status = engine.state().snapshot_status();
    info!(
        "SentryCam shutdown complete ({} frames, {} events, uptime {}s)",
        status.generation,
        status.log_len,
        engine.uptime()
    );

    Ok(())
}
