// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! SentryCam - Camera Intrusion Watch
//!
//! Samples frames from a live feed, classifies them with an object detector
//! and keeps an intrusion flag plus an event history that any number of
//! clients can poll while detection runs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌────────────┐
//! │ Frame Source │ → │ Detection Loop  │ ⇄ │  Detector  │
//! └──────────────┘   └────────┬────────┘   └────────────┘
//!                             │ record_frame_result    └→ AlertSink
//!                             ↓
//!                    ┌─────────────────┐
//!                    │  Shared State   │  running · intrusion · log
//!                    └────────┬────────┘
//!                             ↑ set_running / snapshots
//!                    ┌─────────────────┐   ┌────────────────┐
//!                    │ Control Surface │ ← │ Control Server │ ← clients
//!                    └─────────────────┘   └────────────────┘
//! ```
//!
//! The detection loop is the only writer of frame results. Request handlers
//! only flip the running flag or take snapshots.

#![warn(missing_docs)]

pub mod alert;
pub mod camera;
pub mod config;
pub mod control;
pub mod core;
pub mod detection;
pub mod error;
pub mod streaming;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::{Collaborators, DetectionLoop, Engine, SharedState, TickOutcome};
pub use control::ControlSurface;
pub use detection::{Detection, Detector, Frame, IntrusionEvent};
pub use camera::FrameSource;
pub use alert::AlertSink;
pub use error::{CaptureError, DetectorError, SentryError};

/// SentryCam version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SentryCam name
pub const NAME: &str = "SentryCam";
