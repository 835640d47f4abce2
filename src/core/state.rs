// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Shared state between the detection loop and request handlers
//!
//! Every operation takes the internal lock once, does constant work (or a
//! copy, for log snapshots) and releases it. Nothing here performs I/O or
//! holds the lock across an await point.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::EventLog;
use crate::detection::IntrusionEvent;

/// Health of the detection worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkerHealth {
    /// No frame processed yet
    Starting,
    /// Last frame acquisition succeeded
    Healthy,
    /// Recent frame reads are failing; the loop keeps retrying
    Degraded {
        /// Failed reads since the last good frame
        consecutive_faults: u32,
        /// Most recent read error
        last_error: String,
    },
    /// The loop has stopped for good
    Faulted {
        /// Error that stopped the loop
        reason: String,
    },
}

impl WorkerHealth {
    /// Whether the worker has stopped for good
    pub fn is_faulted(&self) -> bool {
        matches!(self, WorkerHealth::Faulted { .. })
    }
}

/// Flag-level view of the state at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Running flag
    pub running: bool,
    /// Intrusion flag of the last processed frame
    pub intrusion_active: bool,
    /// Number of completed frame results; strictly increases with each one
    pub generation: u64,
    /// Events recorded so far
    pub log_len: usize,
    /// Frames on which the detector failed
    pub detector_faults: u64,
    /// Worker health
    pub health: WorkerHealth,
    /// When the last frame result was published
    pub last_frame_at: Option<DateTime<Utc>>,
}

/// Status plus a copy of the log, taken under one lock acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// Status part
    pub status: StatusSnapshot,
    /// Copy of the log, oldest first
    pub events: Vec<IntrusionEvent>,
}

#[derive(Debug)]
struct Inner {
    running: bool,
    intrusion_active: bool,
    log: EventLog,
    generation: u64,
    detector_faults: u64,
    health: WorkerHealth,
    last_frame_at: Option<DateTime<Utc>>,
}

impl Inner {
    fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            running: self.running,
            intrusion_active: self.intrusion_active,
            generation: self.generation,
            log_len: self.log.len(),
            detector_faults: self.detector_faults,
            health: self.health.clone(),
            last_frame_at: self.last_frame_at,
        }
    }
}

/// Running flag, intrusion flag and event log behind one lock
#[derive(Debug)]
pub struct SharedState {
    inner: RwLock<Inner>,
}

impl SharedState {
    /// Idle, no intrusion, empty log
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                running: false,
                intrusion_active: false,
                log: EventLog::new(),
                generation: 0,
                detector_faults: 0,
                health: WorkerHealth::Starting,
                last_frame_at: None,
            }),
        }
    }

    /// Set the running flag; returns the previous value
    pub fn set_running(&self, running: bool) -> bool {
        let mut inner = self.inner.write();
        std::mem::replace(&mut inner.running, running)
    }

    /// Whether detection is running
    pub fn is_running(&self) -> bool {
        self.inner.read().running
    }

    /// Publish the outcome of one frame: the intrusion flag and its events together
    pub fn record_frame_result<I>(&self, matched: bool, events: I)
    where
        I: IntoIterator<Item = IntrusionEvent>,
    {
        let mut inner = self.inner.write();
        inner.intrusion_active = matched;
        inner.log.append(events);
        inner.generation += 1;
        inner.last_frame_at = Some(Utc::now());
        if !inner.health.is_faulted() {
            inner.health = WorkerHealth::Healthy;
        }
    }

    /// Count a failed frame read; returns the current streak length
    pub fn record_fault(&self, error: &str) -> u32 {
        let mut inner = self.inner.write();
        let streak = match &inner.health {
            WorkerHealth::Faulted { .. } => return 0,
            WorkerHealth::Degraded { consecutive_faults, .. } => consecutive_faults + 1,
            _ => 1,
        };
        inner.health = WorkerHealth::Degraded {
            consecutive_faults: streak,
            last_error: error.to_string(),
        };
        streak
    }

    /// Count a frame the detector failed on
    pub fn record_detector_fault(&self) {
        self.inner.write().detector_faults += 1;
    }

    /// The worker has stopped and will not process frames again
    pub fn mark_faulted(&self, reason: &str) {
        self.inner.write().health = WorkerHealth::Faulted {
            reason: reason.to_string(),
        };
    }

    /// Current worker health
    pub fn health(&self) -> WorkerHealth {
        self.inner.read().health.clone()
    }

    /// Flags and counters without copying the log
    pub fn snapshot_status(&self) -> StatusSnapshot {
        self.inner.read().status()
    }

    /// Copy of the event log
    pub fn snapshot_log(&self) -> Vec<IntrusionEvent> {
        self.inner.read().log.to_vec()
    }

    /// Log rendered as description lines, in order
    pub fn log_descriptions(&self) -> Vec<String> {
        self.inner.read().log.descriptions()
    }

    /// Status and log copy under one lock acquisition
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.read();
        StateSnapshot {
            status: inner.status(),
            events: inner.log.to_vec(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
