//! Engine - composition root for state, worker and control surface

use std::sync::Arc;
use std::time::Instant;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use anyhow::Result;
use tracing::{error, info};

use super::{DetectionLoop, SharedState};
use crate::alert::{self, AlertSink};
use crate::camera::{FrameSource, SimulatedCamera};
use crate::config::Config;
use crate::control::ControlSurface;
use crate::detection::{Detector, RemoteDetector, SimulatedDetector};
use crate::error::SentryError;

/// External collaborators consumed by the detection loop
pub struct Collaborators {
    /// Camera owned by the worker
    pub source: Box<dyn FrameSource>,
    /// Object detector
    pub detector: Arc<dyn Detector>,
    /// Notified once per matched frame
    pub alert: Arc<dyn AlertSink>,
}

impl Collaborators {
    /// Build the collaborators described by the configuration
    ///
    /// The frame source is always the built-in simulator; a remote detector
    /// is used when `detection.remote_url` is set, the simulated one in demo
    /// mode.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cam = &config.camera;
        let source = SimulatedCamera::new(&cam.id, cam.width, cam.height)
            .with_failure_rate(cam.failure_rate);

        let detector: Arc<dyn Detector> = match &config.detection.remote_url {
            Some(url) => {
                info!("Using remote detector at {}", url);
                Arc::new(RemoteDetector::new(url, config.detection.remote_timeout())?)
            }
            None if config.demo_mode => Arc::new(
                SimulatedDetector::new(config.detection.target_class, config.detection.simulated_hit_rate)
                    .with_fault_rate(config.detection.simulated_fault_rate),
            ),
            None => {
                return Err(SentryError::NoDetector(
                    "set detection.remote_url or enable demo mode".into(),
                )
                .into())
            }
        };

        Ok(Self {
            source: Box::new(source),
            detector,
            alert: alert::select(&config.alert),
        })
    }
}

/// Owns the single shared state and the start-once detection worker
pub struct Engine {
    /// Configuration the engine was built from
    pub config: Arc<Config>,
    state: Arc<SharedState>,
    worker: Mutex<Option<DetectionLoop>>,
    shutdown_tx: broadcast::Sender<()>,
    start_time: Instant,
}

impl Engine {
    /// Build state and worker; sets the running flag when `start_on_launch` is on
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        let config = Arc::new(config);
        let state = Arc::new(SharedState::new());

        if config.detection.start_on_launch {
            state.set_running(true);
        }

        let worker = DetectionLoop::new(
            collaborators.source,
            collaborators.detector,
            collaborators.alert,
            state.clone(),
            &config.detection,
        );
        let (shutdown_tx, _) = broadcast::channel(4);

        Self {
            config,
            state,
            worker: Mutex::new(Some(worker)),
            shutdown_tx,
            start_time: Instant::now(),
        }
    }

    /// Hand the detection loop to the runtime; only the first call succeeds
    pub fn spawn(&self) -> std::result::Result<JoinHandle<()>, SentryError> {
        let worker = self.worker.lock().take().ok_or(SentryError::AlreadySpawned)?;
        let shutdown = self.shutdown_tx.subscribe();

        info!("Spawning detection loop...");
        Ok(tokio::spawn(async move {
            if let Err(e) = worker.run(shutdown).await {
                error!("{}", e);
            }
        }))
    }

    /// Handle for request handlers
    pub fn control(&self) -> ControlSurface {
        ControlSurface::new(self.state.clone())
    }

    /// Shared state
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Receiver fired by [`Engine::shutdown`]
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal the worker and every subscriber to stop
    pub fn shutdown(&self) {
        info!("Stopping engine...");
        let _ = self.shutdown_tx.send(());
    }

    /// Seconds since construction
    pub fn uptime(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
