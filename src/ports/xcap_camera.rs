use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::core::errors::CameraError;
use crate::core::interfaces::ports::{CameraDevice, VideoStream};
use crate::core::models::{CaptureBuffer, VideoConstraints};
use crate::global_constants::LOG_TAG_CAMERA;

/// Uses the primary display as the video source, for assignments already
/// open on screen.
pub struct XcapCamera;

impl XcapCamera {
    pub fn initialize() -> Self {
        log::debug!("{} initializing xcap screen source", LOG_TAG_CAMERA);
        Self
    }

    fn primary_monitor() -> Result<xcap::Monitor> {
        let monitors = xcap::Monitor::all().context("failed to list monitors")?;
        let mut fallback = None;

        for monitor in monitors {
            if monitor.is_primary().unwrap_or(false) {
                return Ok(monitor);
            }
            if fallback.is_none() {
                fallback = Some(monitor);
            }
        }

        fallback.ok_or_else(|| anyhow::anyhow!("no monitors found"))
    }

    fn monitor_by_id(monitor_id: u32) -> Result<xcap::Monitor> {
        xcap::Monitor::all()
            .context("failed to list monitors")?
            .into_iter()
            .find(|monitor| monitor.id().ok() == Some(monitor_id))
            .ok_or_else(|| anyhow::anyhow!("monitor {} disconnected", monitor_id))
    }

    fn classify_failure(error: &anyhow::Error) -> CameraError {
        let detail = format!("{:#}", error);
        let lowered = detail.to_lowercase();
        if ["permission", "denied", "not authorized"]
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            CameraError::PermissionDenied(detail)
        } else {
            CameraError::DeviceUnavailable(detail)
        }
    }

    fn open_primary(constraints: &VideoConstraints) -> Result<XcapStream> {
        let monitor = Self::primary_monitor()?;
        let monitor_id = monitor.id().context("failed to read monitor id")?;
        let width = monitor.width().context("failed to read monitor width")?;
        let height = monitor.height().context("failed to read monitor height")?;

        if !constraints.accepts_resolution(width, height) {
            anyhow::bail!(
                "display {}x{} is below the minimum {}x{}",
                width,
                height,
                constraints.width.min,
                constraints.height.min
            );
        }

        // Capturing once up front surfaces a missing screen-recording grant now.
        monitor
            .capture_image()
            .context("screen capture permission check failed")?;

        Ok(XcapStream {
            monitor_id,
            width,
            height,
            active: true,
        })
    }
}

#[async_trait]
impl CameraDevice for XcapCamera {
    async fn open_stream(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraError> {
        match Self::open_primary(constraints) {
            Ok(stream) => {
                log::info!("{} opened {}", LOG_TAG_CAMERA, stream.describe());
                Ok(Box::new(stream))
            }
            Err(error) => {
                log::error!("{} failed to open display: {:#}", LOG_TAG_CAMERA, error);
                Err(Self::classify_failure(&error))
            }
        }
    }
}

struct XcapStream {
    monitor_id: u32,
    width: u32,
    height: u32,
    active: bool,
}

fn convert_image_to_capture_buffer(image: xcap::image::RgbaImage) -> CaptureBuffer {
    let width_pixels = image.width();
    let height_pixels = image.height();
    CaptureBuffer::build_from_raw_data(width_pixels, height_pixels, image.into_raw())
}

impl VideoStream for XcapStream {
    fn is_active(&self) -> bool {
        self.active
    }

    fn grab_still(&mut self) -> Result<Option<CaptureBuffer>> {
        let monitor = match XcapCamera::monitor_by_id(self.monitor_id) {
            Ok(monitor) => monitor,
            Err(error) => {
                self.active = false;
                return Err(error);
            }
        };

        let image = monitor
            .capture_image()
            .context("failed to capture monitor image")?;
        log::info!(
            "{} captured {}x{} still from display {}",
            LOG_TAG_CAMERA,
            image.width(),
            image.height(),
            self.monitor_id
        );

        Ok(Some(convert_image_to_capture_buffer(image)))
    }

    fn describe(&self) -> String {
        format!("display {} ({}x{})", self.monitor_id, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_image_to_capture_buffer_keeps_dimensions() {
        let raw_data = vec![255u8; 100 * 50 * 4];
        let image = xcap::image::RgbaImage::from_raw(100, 50, raw_data).unwrap();

        let buffer = convert_image_to_capture_buffer(image);

        assert_eq!((buffer.width, buffer.height), (100, 50));
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_permission_failures_are_classified_as_denied() {
        let denied = anyhow::anyhow!("screen capture permission check failed")
            .context("Screen Recording not authorized");
        let missing = anyhow::anyhow!("no monitors found");

        assert!(matches!(
            XcapCamera::classify_failure(&denied),
            CameraError::PermissionDenied(_)
        ));
        assert!(matches!(
            XcapCamera::classify_failure(&missing),
            CameraError::DeviceUnavailable(_)
        ));
    }

    #[test]
    fn test_describe_names_display_and_size() {
        let stream = XcapStream {
            monitor_id: 7,
            width: 2560,
            height: 1440,
            active: true,
        };

        assert_eq!(stream.describe(), "display 7 (2560x1440)");
    }
}
