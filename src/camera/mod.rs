//! Camera module - frame source interface and simulation

mod simulator;

pub use simulator::SimulatedCamera;

use async_trait::async_trait;

use crate::detection::Frame;
use crate::error::CaptureError;

/// Source of live frames
///
/// Owned exclusively by the detection loop. Implementations backed by a
/// blocking driver should move the read onto `tokio::task::spawn_blocking`.
#[async_trait]
pub trait FrameSource: Send {
    /// Device identifier for logs
    fn id(&self) -> &str;

    /// Acquire the next frame
    async fn read(&mut self) -> Result<Frame, CaptureError>;
}
