// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! HTTP client for an external inference service

use std::time::Duration;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BoundingBox, Detection, Detector, Frame};
use crate::error::DetectorError;

/// Forwards frames to a model server and parses its detections
pub struct RemoteDetector {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest {
    sequence: u64,
    width: u32,
    height: u32,
    encoding: &'static str,
    pixels: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    detections: Vec<RemoteDetection>,
}

#[derive(Debug, Deserialize)]
struct RemoteDetection {
    class_id: u32,
    confidence: f32,
    bbox: [f32; 4],
}

impl RemoteDetector {
    /// Client for the prediction endpoint at `url`
    pub fn new(url: &str, timeout: Duration) -> Result<Self, DetectorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Prediction endpoint
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn encode_request(frame: &Frame) -> PredictRequest {
    PredictRequest {
        sequence: frame.sequence,
        width: frame.width,
        height: frame.height,
        encoding: "rgb8",
        pixels: STANDARD.encode(&frame.pixels),
    }
}

fn decode_response(body: &str) -> Result<Vec<Detection>, DetectorError> {
    let response: PredictResponse =
        serde_json::from_str(body).map_err(|e| DetectorError::Decode(e.to_string()))?;

    Ok(response
        .detections
        .into_iter()
        .map(|d| {
            let [x1, y1, x2, y2] = d.bbox;
            Detection::new(d.class_id, d.confidence, BoundingBox::new(x1, y1, x2, y2))
        })
        .collect())
}

#[async_trait]
impl Detector for RemoteDetector {
    fn name(&self) -> &str {
        "remote"
    }

    async fn predict(&self, frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        let body = self
            .client
            .post(&self.url)
            .json(&encode_request(frame))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let detections = decode_response(&body)?;
        debug!("Remote detector returned {} detections for frame {}", detections.len(), frame.sequence);
        Ok(detections)
    }
}
