// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Camera simulator for demo/testing

use async_trait::async_trait;
use rand::prelude::*;

use super::FrameSource;
use crate::detection::Frame;
use crate::error::CaptureError;

/// Produces noisy RGB frames, optionally dropping some reads
pub struct SimulatedCamera {
    id: String,
    width: u32,
    height: u32,
    sequence: u64,
    failure_rate: f64,
    rng: StdRng,

    // Simulation state
    brightness: f64,
}

impl SimulatedCamera {
    /// Camera producing `width` x `height` noise frames
    pub fn new(id: &str, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            width,
            height,
            sequence: 0,
            failure_rate: 0.0,
            rng: StdRng::from_entropy(),
            brightness: 96.0,
        }
    }

    /// Probability that a read fails transiently
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    /// Deterministic frames and dropouts
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Frames delivered so far
    pub fn frames_captured(&self) -> u64 {
        self.sequence
    }

    fn generate_pixels(&mut self) -> Vec<u8> {
        // Slow lighting drift with per-pixel sensor noise
        self.brightness = (self.brightness + self.rng.gen_range(-2.0..2.0)).clamp(32.0, 200.0);
        let base = self.brightness;

        let len = self.width as usize * self.height as usize * 3;
        (0..len)
            .map(|_| (base + self.rng.gen_range(-12.0..12.0)).clamp(0.0, 255.0) as u8)
            .collect()
    }
}

#[async_trait]
impl FrameSource for SimulatedCamera {
    fn id(&self) -> &str {
        &self.id
    }

    async fn read(&mut self) -> Result<Frame, CaptureError> {
        if self.rng.gen::<f64>() < self.failure_rate {
            return Err(CaptureError::Transient(format!(
                "simulated dropout on {}",
                self.id
            )));
        }

        self.sequence += 1;
        let pixels = self.generate_pixels();
        Ok(Frame::new(self.sequence, self.width, self.height, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_are_sequenced() {
        let mut cam = SimulatedCamera::new("cam0", 16, 8).with_seed(3);

        let first = cam.read().await.unwrap();
        let second = cam.read().await.unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(first.pixels.len(), 16 * 8 * 3);
        assert_eq!(cam.frames_captured(), 2);
    }

    #[tokio::test]
    async fn test_dropout() {
        let mut cam = SimulatedCamera::new("cam0", 4, 4).with_failure_rate(1.0);

        let err = cam.read().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(cam.frames_captured(), 0);
    }

    #[tokio::test]
    async fn test_boxed_source() {
        let mut source: Box<dyn FrameSource> = Box::new(SimulatedCamera::new("boxed", 2, 2));
        assert_eq!(source.id(), "boxed");
        assert!(source.read().await.is_ok());
    }
}
