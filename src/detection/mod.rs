//! Detection module - detector interface and intrusion classification

mod remote;
mod simulated;

pub use remote::RemoteDetector;
pub use simulated::SimulatedDetector;

use std::fmt;
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DetectorError;

/// Message carried by every intrusion event
pub const INTRUSION_MESSAGE: &str = "Intrusion detected";

/// Timestamp layout used in event descriptions
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// COCO class id of "person"
pub const PERSON_CLASS: u32 = 0;

/// Axis-aligned box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

impl BoundingBox {
    /// Box from its corner coordinates
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Height in pixels
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Zero for inverted boxes
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// One classified object instance reported by a detector for a single frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Model class index (COCO numbering)
    pub class_id: u32,
    /// Detector score; not necessarily in [0, 1]
    pub confidence: f32,
    /// Box in frame pixel coordinates
    pub bbox: BoundingBox,
}

impl Detection {
    /// Detection of `class_id` inside `bbox`
    pub fn new(class_id: u32, confidence: f32, bbox: BoundingBox) -> Self {
        Self { class_id, confidence, bbox }
    }
}

/// A logged occurrence of a detection matching the monitored class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrusionEvent {
    /// When the frame was classified
    pub timestamp: DateTime<Local>,
    /// Event text without the timestamp
    pub message: String,
}

impl IntrusionEvent {
    /// Event stamped with the current local time
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    /// Event stamped at `timestamp`
    pub fn at(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            message: INTRUSION_MESSAGE.to_string(),
        }
    }

    /// Human readable line, e.g. `Intrusion detected: 2026-10-19 21:04:11`
    pub fn describe(&self) -> String {
        format!("{}: {}", self.message, self.timestamp.format(TIMESTAMP_FORMAT))
    }
}

impl fmt::Display for IntrusionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// One captured image, owned by the detection loop for a single iteration
#[derive(Debug, Clone)]
pub struct Frame {
    /// Per-source frame counter, starting at 1
    pub sequence: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Packed RGB8 pixels, row-major
    pub pixels: Vec<u8>,
    /// Acquisition time
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    /// Frame captured now
    pub fn new(sequence: u64, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            sequence,
            width,
            height,
            pixels,
            captured_at: Utc::now(),
        }
    }

    /// All-black frame of the given size
    pub fn blank(sequence: u64, width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        Self::new(sequence, width, height, vec![0; len])
    }
}

/// Object detector collaborator
#[async_trait]
pub trait Detector: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Classify the content of one frame
    async fn predict(&self, frame: &Frame) -> Result<Vec<Detection>, DetectorError>;
}

/// Outcome of checking one frame's detections against the target class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameVerdict {
    /// At least one detection qualified
    pub matched: bool,
    /// One event per qualifying detection
    pub events: Vec<IntrusionEvent>,
}

/// Which detections count as an intrusion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrusionRule {
    /// Class id that counts as an intrusion
    pub target_class: u32,
    /// Confidence floor; `None` accepts any confidence the detector reports
    pub min_confidence: Option<f32>,
}

impl IntrusionRule {
    /// Rule for `target_class` with an optional confidence floor
    pub fn new(target_class: u32, min_confidence: Option<f32>) -> Self {
        Self { target_class, min_confidence }
    }

    /// Whether this single detection is an intrusion
    pub fn qualifies(&self, detection: &Detection) -> bool {
        detection.class_id == self.target_class
            && self.min_confidence.map_or(true, |min| detection.confidence >= min)
    }

    /// One event per qualifying detection, all stamped with the same instant.
    pub fn assess(&self, detections: &[Detection]) -> FrameVerdict {
        let now = Local::now();
        let events: Vec<IntrusionEvent> = detections
            .iter()
            .filter(|d| self.qualifies(d))
            .map(|_| IntrusionEvent::at(now))
            .collect();

        FrameVerdict {
            matched: !events.is_empty(),
            events,
        }
    }
}

impl Default for IntrusionRule {
    fn default() -> Self {
        Self::new(PERSON_CLASS, None)
    }
}
