// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Control surface - start/stop commands and status queries
//!
//! Request handlers call these against the shared state. None of them wait on
//! the detection worker; commands acknowledge even when the worker is faulted.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{SharedState, WorkerHealth};

/// Command acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable outcome
    pub status: String,
}

/// Current intrusion flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReply {
    /// Whether the last processed frame contained an intrusion
    pub intrusion: bool,
}

/// Event history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsReply {
    /// One description per event, oldest first
    pub logs: Vec<String>,
}

/// Worker diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReply {
    /// Running flag
    pub running: bool,
    /// Intrusion flag of the last processed frame
    pub intrusion: bool,
    /// Frames whose result has been published
    pub frames_processed: u64,
    /// Length of the event log
    pub events: usize,
    /// Frames on which the detector failed
    pub detector_faults: u64,
    /// Worker health
    pub health: WorkerHealth,
}

/// Request accepted by [`ControlSurface::execute`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Set the running flag
    Start,
    /// Clear the running flag
    Stop,
    /// Query the intrusion flag
    Status,
    /// Query the event log
    Logs,
    /// Query worker diagnostics
    Health,
    /// Liveness check
    Ping,
}

/// Reply to a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Reply to start and stop
    Ack(Ack),
    /// Reply to status
    Status(StatusReply),
    /// Reply to logs
    Logs(LogsReply),
    /// Reply to health
    Health(HealthReply),
    /// Reply to ping
    Pong {
        /// Always `"pong"`
        #[serde(rename = "type")]
        kind: &'static str,
    },
}

/// Handle given to request handlers; cheap to clone
#[derive(Debug, Clone)]
pub struct ControlSurface {
    state: Arc<SharedState>,
}

impl ControlSurface {
    /// Handle over `state`
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Begin detection; idempotent
    pub fn start(&self) -> Ack {
        if !self.state.set_running(true) {
            info!("Detection started");
        }
        Ack {
            status: "Detection started".to_string(),
        }
    }

    /// Pause detection; idempotent. The log is kept
    pub fn stop(&self) -> Ack {
        if self.state.set_running(false) {
            info!("Detection stopped");
        }
        Ack {
            status: "Detection stopped".to_string(),
        }
    }

    /// Intrusion flag of the last processed frame
    pub fn status(&self) -> StatusReply {
        StatusReply {
            intrusion: self.state.snapshot_status().intrusion_active,
        }
    }

    /// Copy of the event log as description lines
    pub fn logs(&self) -> LogsReply {
        LogsReply {
            logs: self.state.log_descriptions(),
        }
    }

    /// Current worker health
    pub fn health(&self) -> HealthReply {
        let status = self.state.snapshot_status();
        HealthReply {
            running: status.running,
            intrusion: status.intrusion_active,
            frames_processed: status.generation,
            events: status.log_len,
            detector_faults: status.detector_faults,
            health: status.health,
        }
    }

    /// Dispatch a decoded wire command
    pub fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Start => Reply::Ack(self.start()),
            Command::Stop => Reply::Ack(self.stop()),
            Command::Status => Reply::Status(self.status()),
            Command::Logs => Reply::Logs(self.logs()),
            Command::Health => Reply::Health(self.health()),
            Command::Ping => Reply::Pong { kind: "pong" },
        }
    }
}
