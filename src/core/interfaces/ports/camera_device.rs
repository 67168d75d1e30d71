use async_trait::async_trait;

use crate::core::errors::CameraError;
use crate::core::models::{CaptureBuffer, VideoConstraints};

/// A live source of frames negotiated with the platform.
pub trait VideoStream: Send {
    fn is_active(&self) -> bool;

    /// Takes one still of what the stream currently shows. `Ok(None)` means
    /// the device produced no data.
    fn grab_still(&mut self) -> anyhow::Result<Option<CaptureBuffer>>;

    fn describe(&self) -> String;
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Prompts for access if needed and opens a stream honouring the
    /// constraints.
    async fn open_stream(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraError>;
}
