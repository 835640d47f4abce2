// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Error types for the collaborators and the engine

use thiserror::Error;

/// Failure to acquire a frame from a [`FrameSource`](crate::camera::FrameSource).
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The read failed but the device may deliver frames again.
    #[error("frame read failed: {0}")]
    Transient(String),

    /// The device reported that it is gone for good.
    #[error("frame source disconnected: {0}")]
    Disconnected(String),
}

impl CaptureError {
    /// Whether the loop may retry after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, CaptureError::Transient(_))
    }
}

/// Failure of a single [`Detector::predict`](crate::detection::Detector::predict) call.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// The model failed on this frame.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The remote inference service could not be reached or answered with an error status.
    #[error("detector request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The detector answered with something that is not a detection list.
    #[error("malformed detector response: {0}")]
    Decode(String),
}

/// Engine and configuration errors.
#[derive(Debug, Error)]
pub enum SentryError {
    /// The detection loop has already been handed to the runtime.
    #[error("detection loop already spawned")]
    AlreadySpawned,

    /// A configuration value is out of range.
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Offending key, dotted path from the config root.
        key: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// No detector could be built from the configuration.
    #[error("no detector configured: {0}")]
    NoDetector(String),
}
