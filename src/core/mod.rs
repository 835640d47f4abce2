//! Core module - shared state, the detection loop and the engine that wires them

mod detection_loop;
mod engine;
mod event_log;
mod state;

pub use detection_loop::{DetectionLoop, TickOutcome};
pub use engine::{Collaborators, Engine};
pub use event_log::EventLog;
pub use state::{SharedState, StateSnapshot, StatusSnapshot, WorkerHealth};
