use crate::core::errors::CaptureError;
use crate::core::models::EncodedFrame;
use crate::core::services::CapabilityGrant;
use crate::global_constants::LOG_TAG_CAPTURE;

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCapturer;

impl FrameCapturer {
    pub fn new() -> Self {
        Self
    }

    /// Takes exactly one still from the live stream and freezes the grant on
    /// it until the caller resumes the preview.
    pub fn capture_frame(
        &self,
        grant: Option<&mut CapabilityGrant>,
    ) -> Result<EncodedFrame, CaptureError> {
        let grant = grant.ok_or(CaptureError::NoActiveStream)?;

        if !grant.is_active() {
            return Err(CaptureError::NoActiveStream);
        }
        if grant.is_showing_still() {
            return Err(CaptureError::StillShowing);
        }

        log::debug!("{} taking still from {}", LOG_TAG_CAPTURE, grant.describe());

        let buffer = grant
            .stream_mut()
            .grab_still()
            .map_err(|error| CaptureError::Device(format!("{:#}", error)))?
            .ok_or(CaptureError::EmptyFrame)?;

        if buffer.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }

        let frame = buffer
            .encode_png()
            .map_err(|error| CaptureError::Encoding(format!("{:#}", error)))?;

        grant.freeze_on_still();

        log::info!(
            "{} captured {}x{} still ({} bytes)",
            LOG_TAG_CAPTURE,
            frame.width,
            frame.height,
            frame.size_in_bytes()
        );

        Ok(frame)
    }
}
