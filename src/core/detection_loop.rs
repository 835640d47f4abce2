// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Background detection worker
//!
//! The loop is the only writer of frame results into [`SharedState`]. Each
//! iteration checks the running flag; while it is clear no frame is consumed.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use anyhow::Result;
use tracing::{debug, error, info, warn};

use super::SharedState;
use crate::alert::AlertSink;
use crate::camera::FrameSource;
use crate::config::{DetectionConfig, FrameFaultPolicy};
use crate::detection::{Detector, IntrusionRule};
use crate::error::CaptureError;

/// What one iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Running flag clear; nothing consumed
    Idle,
    /// A frame went through the detector and its result was recorded
    Processed {
        /// The frame contained an intrusion
        matched: bool,
        /// Events appended to the log
        events: usize,
    },
    /// Frame read failed; the next iteration retries
    FrameFault,
    /// The loop must not run again
    Terminated,
}

/// Polls the frame source, classifies frames and publishes results
pub struct DetectionLoop {
    source: Box<dyn FrameSource>,
    detector: Arc<dyn Detector>,
    alert: Arc<dyn AlertSink>,
    state: Arc<SharedState>,
    rule: IntrusionRule,
    period: Duration,
    fault_policy: FrameFaultPolicy,
}

impl DetectionLoop {
    /// Worker over the given collaborators, configured by `config`
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Arc<dyn Detector>,
        alert: Arc<dyn AlertSink>,
        state: Arc<SharedState>,
        config: &DetectionConfig,
    ) -> Self {
        Self {
            source,
            detector,
            alert,
            state,
            rule: IntrusionRule::new(config.target_class, config.min_confidence),
            period: config.period(),
            fault_policy: config.frame_fault_policy,
        }
    }

    /// Wait between iterations
    pub fn period(&self) -> Duration {
        self.period
    }

    /// State this worker publishes into
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Run one iteration without the trailing wait
    pub async fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running() {
            return TickOutcome::Idle;
        }

        let frame = match self.source.read().await {
            Ok(frame) => frame,
            Err(e) => return self.on_capture_error(e),
        };

        let detections = match self.detector.predict(&frame).await {
            Ok(detections) => detections,
            Err(e) => {
                warn!("Detector '{}' failed on frame {}: {}", self.detector.name(), frame.sequence, e);
                self.state.record_detector_fault();
                Vec::new()
            }
        };
        let sequence = frame.sequence;
        drop(frame);

        let verdict = self.rule.assess(&detections);
        let matched = verdict.matched;
        let events = verdict.events.len();

        self.state.record_frame_result(matched, verdict.events);

        if matched {
            info!("Intrusion on frame {} ({} detections of class {})", sequence, events, self.rule.target_class);
            self.alert.notify();
        } else {
            debug!("Frame {}: {} detections, no intrusion", sequence, detections.len());
        }

        TickOutcome::Processed { matched, events }
    }

    fn on_capture_error(&self, err: CaptureError) -> TickOutcome {
        let source = self.source.id();

        match (&err, self.fault_policy) {
            (CaptureError::Transient(_), FrameFaultPolicy::Retry) => {
                let streak = self.state.record_fault(&err.to_string());
                warn!("Frame read from {} failed ({} in a row): {}", source, streak, err);
                TickOutcome::FrameFault
            }
            _ => {
                error!("Frame source {} lost, detection halted: {}", source, err);
                self.state.mark_faulted(&err.to_string());
                TickOutcome::Terminated
            }
        }
    }

    /// Iterate until shutdown or a terminal frame-source fault
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!(
            "Detection loop started on {} with detector '{}' (period {:?}, target class {})",
            self.source.id(),
            self.detector.name(),
            self.period,
            self.rule.target_class
        );

        loop {
            if self.tick().await == TickOutcome::Terminated {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.period) => {}
                _ = shutdown.recv() => {
                    info!("Detection loop shutting down...");
                    return Ok(());
                }
            }
        }

        anyhow::bail!("detection loop terminated: {:?}", self.state.health())
    }
}
