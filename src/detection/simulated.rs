// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Simulated detector for demo/testing

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::prelude::*;

use super::{BoundingBox, Detection, Detector, Frame};
use crate::error::DetectorError;

/// Background classes the simulator sprinkles in (car, dog, chair)
const CLUTTER_CLASSES: [u32; 3] = [2, 16, 56];

/// Reports the target class on a random subset of frames
pub struct SimulatedDetector {
    target_class: u32,
    hit_rate: f64,
    fault_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedDetector {
    /// Reports `target_class` on roughly `hit_rate` of frames
    pub fn new(target_class: u32, hit_rate: f64) -> Self {
        Self {
            target_class,
            hit_rate: hit_rate.clamp(0.0, 1.0),
            fault_rate: 0.0,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for reproducible runs
    pub fn with_seed(target_class: u32, hit_rate: f64, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..Self::new(target_class, hit_rate)
        }
    }

    /// Probability that a call fails with an inference error
    pub fn with_fault_rate(mut self, fault_rate: f64) -> Self {
        self.fault_rate = fault_rate.clamp(0.0, 1.0);
        self
    }

    fn random_box(rng: &mut StdRng, frame: &Frame) -> BoundingBox {
        let w = frame.width.max(2) as f32;
        let h = frame.height.max(2) as f32;
        let x1 = rng.gen_range(0.0..w / 2.0);
        let y1 = rng.gen_range(0.0..h / 2.0);
        let x2 = (x1 + rng.gen_range(w / 8.0..w / 2.0)).min(w);
        let y2 = (y1 + rng.gen_range(h / 4.0..h / 2.0)).min(h);
        BoundingBox::new(x1, y1, x2, y2)
    }
}

#[async_trait]
impl Detector for SimulatedDetector {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn predict(&self, frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        let mut rng = self.rng.lock();

        if rng.gen::<f64>() < self.fault_rate {
            return Err(DetectorError::Inference(format!(
                "simulated fault on frame {}",
                frame.sequence
            )));
        }

        let mut detections = Vec::new();

        if rng.gen::<f64>() < self.hit_rate {
            let confidence = rng.gen_range(0.45..0.98);
            detections.push(Detection::new(
                self.target_class,
                confidence,
                Self::random_box(&mut rng, frame),
            ));
        }

        if rng.gen::<f64>() < 0.3 {
            let class_id = CLUTTER_CLASSES[rng.gen_range(0..CLUTTER_CLASSES.len())];
            if class_id != self.target_class {
                let confidence = rng.gen_range(0.3..0.9);
                detections.push(Detection::new(class_id, confidence, Self::random_box(&mut rng, frame)));
            }
        }

        Ok(detections)
    }
}
