//! Scripted collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sentrycam::config::DetectionConfig;
use sentrycam::detection::{BoundingBox, Detection, Frame, PERSON_CLASS};
use sentrycam::{AlertSink, CaptureError, DetectionLoop, Detector, DetectorError, FrameSource, SharedState};

pub enum Read {
    Frame,
    Transient,
    Disconnected,
}

/// Frame source replaying a fixed script; transient failures once exhausted
pub struct ScriptedSource {
    script: VecDeque<Read>,
    sequence: u64,
    reads: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Read>) -> Self {
        Self {
            script: script.into(),
            sequence: 0,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn frames(n: usize) -> Self {
        Self::new((0..n).map(|_| Read::Frame).collect())
    }

    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        self.reads.clone()
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn read(&mut self) -> Result<Frame, CaptureError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(Read::Frame) => {
                self.sequence += 1;
                Ok(Frame::blank(self.sequence, 8, 8))
            }
            Some(Read::Transient) => Err(CaptureError::Transient("usb timeout".into())),
            Some(Read::Disconnected) => Err(CaptureError::Disconnected("device removed".into())),
            None => Err(CaptureError::Transient("script exhausted".into())),
        }
    }
}

/// What the detector answers for a given frame sequence number
#[derive(Clone)]
pub enum Answer {
    Classes(Vec<u32>),
    Fault,
}

/// Detector answering per frame sequence; unlisted frames have no detections
#[derive(Default)]
pub struct ScriptedDetector {
    answers: HashMap<u64, Answer>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, sequence: u64, answer: Answer) -> Self {
        self.answers.insert(sequence, answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn person() -> u32 {
    PERSON_CLASS
}

#[async_trait]
impl Detector for ScriptedDetector {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn predict(&self, frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(&frame.sequence) {
            Some(Answer::Fault) => Err(DetectorError::Inference(format!("boom on {}", frame.sequence))),
            Some(Answer::Classes(classes)) => Ok(classes
                .iter()
                .map(|&c| Detection::new(c, 0.9, BoundingBox::new(1.0, 1.0, 4.0, 6.0)))
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}

/// Counts notifications
#[derive(Default)]
pub struct CountingAlert {
    count: AtomicUsize,
}

impl CountingAlert {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl AlertSink for CountingAlert {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn notify(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub state: Arc<SharedState>,
    pub detector: Arc<ScriptedDetector>,
    pub alert: Arc<CountingAlert>,
    pub reads: Arc<AtomicUsize>,
    pub worker: DetectionLoop,
}

pub fn harness(source: ScriptedSource, detector: ScriptedDetector, config: &DetectionConfig) -> Harness {
    let state = Arc::new(SharedState::new());
    let detector = Arc::new(detector);
    let alert = Arc::new(CountingAlert::default());
    let reads = source.read_counter();

    let worker = DetectionLoop::new(
        Box::new(source),
        detector.clone(),
        alert.clone(),
        state.clone(),
        config,
    );

    Harness {
        state,
        detector,
        alert,
        reads,
        worker,
    }
}

pub fn reads(h: &Harness) -> usize {
    h.reads.load(Ordering::SeqCst)
}
