use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::errors::CameraError;
use crate::core::interfaces::ports::{CameraDevice, VideoStream};
use crate::core::models::{CaptureBuffer, VideoConstraints};
use crate::global_constants::LOG_TAG_CAMERA;

/// Treats a photo on disk as the camera feed. Useful where the picture was
/// taken by another device and copied over.
pub struct StillImageCamera {
    source: PathBuf,
}

impl StillImageCamera {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    fn map_read_error(source: &Path, error: std::io::Error) -> CameraError {
        let detail = format!("{}: {}", source.display(), error);
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => CameraError::PermissionDenied(detail),
            _ => CameraError::DeviceUnavailable(detail),
        }
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    async fn open_stream(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraError> {
        log::debug!("{} opening photo {:?}", LOG_TAG_CAMERA, self.source);

        let bytes = tokio::fs::read(&self.source)
            .await
            .map_err(|error| Self::map_read_error(&self.source, error))?;

        let frame = image::load_from_memory(&bytes)
            .map_err(|error| {
                CameraError::DeviceUnavailable(format!(
                    "{} is not a readable image: {}",
                    self.source.display(),
                    error
                ))
            })?
            .to_rgba8();

        let (width, height) = frame.dimensions();
        if !constraints.accepts_resolution(width, height)
            && !constraints.accepts_resolution(height, width)
        {
            return Err(CameraError::DeviceUnavailable(format!(
                "{}x{} is below the minimum {}x{}",
                width, height, constraints.width.min, constraints.height.min
            )));
        }

        log::info!(
            "{} photo {:?} opened at {}x{} ({} facing requested)",
            LOG_TAG_CAMERA,
            self.source,
            width,
            height,
            constraints.facing_mode
        );

        Ok(Box::new(StillImageStream {
            source: self.source.clone(),
            frame: CaptureBuffer::build_from_raw_data(width, height, frame.into_raw()),
        }))
    }
}

struct StillImageStream {
    source: PathBuf,
    frame: CaptureBuffer,
}

impl VideoStream for StillImageStream {
    fn is_active(&self) -> bool {
        !self.frame.is_empty()
    }

    fn grab_still(&mut self) -> anyhow::Result<Option<CaptureBuffer>> {
        Ok(Some(self.frame.clone()))
    }

    fn describe(&self) -> String {
        format!(
            "photo {} ({}x{})",
            self.source.display(),
            self.frame.width,
            self.frame.height
        )
    }
}
