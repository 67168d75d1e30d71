use std::sync::Arc;

use crate::core::errors::CameraError;
use crate::core::interfaces::ports::{CameraDevice, VideoStream};
use crate::core::models::{DeviceClass, VideoConstraints};
use crate::global_constants::LOG_TAG_CAMERA;

/// An open video stream plus whether it is currently frozen on a still.
pub struct CapabilityGrant {
    stream: Box<dyn VideoStream>,
    constraints: VideoConstraints,
    showing_still: bool,
}

impl std::fmt::Debug for CapabilityGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityGrant")
            .field("stream", &self.stream.describe())
            .field("constraints", &self.constraints)
            .field("showing_still", &self.showing_still)
            .finish()
    }
}

impl CapabilityGrant {
    pub fn new(stream: Box<dyn VideoStream>, constraints: VideoConstraints) -> Self {
        Self {
            stream,
            constraints,
            showing_still: false,
        }
    }

    pub fn constraints(&self) -> &VideoConstraints {
        &self.constraints
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_active()
    }

    pub fn is_showing_still(&self) -> bool {
        self.showing_still
    }

    pub fn describe(&self) -> String {
        self.stream.describe()
    }

    pub(crate) fn stream_mut(&mut self) -> &mut dyn VideoStream {
        self.stream.as_mut()
    }

    pub(crate) fn freeze_on_still(&mut self) {
        self.showing_still = true;
    }

    /// Back to live preview, ready for the next capture.
    pub fn resume_preview(&mut self) {
        self.showing_still = false;
    }
}

pub struct CapabilityChecker {
    camera: Arc<dyn CameraDevice>,
}

impl CapabilityChecker {
    pub fn new(camera: Arc<dyn CameraDevice>) -> Self {
        Self { camera }
    }

    pub async fn enable_capture(
        &self,
        device_class: DeviceClass,
    ) -> Result<CapabilityGrant, CameraError> {
        let constraints = VideoConstraints::for_device(device_class);

        log::info!(
            "{} requesting camera for {} device: facing={}, ideal {}x{}, min {}x{}",
            LOG_TAG_CAMERA,
            device_class,
            constraints.facing_mode,
            constraints.width.ideal,
            constraints.height.ideal,
            constraints.width.min,
            constraints.height.min
        );

        let stream = self.camera.open_stream(&constraints).await.map_err(|error| {
            log::error!("{} camera request failed: {}", LOG_TAG_CAMERA, error);
            error
        })?;

        if !stream.is_active() {
            return Err(CameraError::DeviceUnavailable(format!(
                "{} opened but is not delivering frames",
                stream.describe()
            )));
        }

        log::info!("{} camera granted: {}", LOG_TAG_CAMERA, stream.describe());
        Ok(CapabilityGrant::new(stream, constraints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CaptureBuffer, FacingMode};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockStream {
        active: bool,
    }

    impl VideoStream for MockStream {
        fn is_active(&self) -> bool {
            self.active
        }

        fn grab_still(&mut self) -> anyhow::Result<Option<CaptureBuffer>> {
            Ok(None)
        }

        fn describe(&self) -> String {
            "mock stream".to_string()
        }
    }

    struct MockCamera {
        outcome: Result<bool, CameraError>,
        requested: Mutex<Vec<VideoConstraints>>,
    }

    impl MockCamera {
        fn granting(active: bool) -> Self {
            Self {
                outcome: Ok(active),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: CameraError) -> Self {
            Self {
                outcome: Err(error),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CameraDevice for MockCamera {
        async fn open_stream(
            &self,
            constraints: &VideoConstraints,
        ) -> Result<Box<dyn VideoStream>, CameraError> {
            self.requested.lock().unwrap().push(*constraints);
            match &self.outcome {
                Ok(active) => Ok(Box::new(MockStream { active: *active })),
                Err(error) => Err(error.clone()),
            }
        }
    }

    #[tokio::test]
    async fn test_enable_capture_requests_environment_camera_on_mobile() {
        let camera = Arc::new(MockCamera::granting(true));
        let checker = CapabilityChecker::new(camera.clone());

        let grant = checker.enable_capture(DeviceClass::Mobile).await.unwrap();

        assert_eq!(grant.constraints().facing_mode, FacingMode::Environment);
        assert!(!grant.is_showing_still());
        assert_eq!(
            camera.requested.lock().unwrap()[0].facing_mode,
            FacingMode::Environment
        );
    }

    #[tokio::test]
    async fn test_enable_capture_requests_user_camera_on_desktop() {
        let camera = Arc::new(MockCamera::granting(true));
        let checker = CapabilityChecker::new(camera.clone());

        checker.enable_capture(DeviceClass::Desktop).await.unwrap();

        assert_eq!(
            camera.requested.lock().unwrap()[0].facing_mode,
            FacingMode::User
        );
    }

    #[tokio::test]
    async fn test_enable_capture_passes_permission_denied_through() {
        let checker = CapabilityChecker::new(Arc::new(MockCamera::failing(
            CameraError::PermissionDenied("NotAllowedError".into()),
        )));

        let result = checker.enable_capture(DeviceClass::Desktop).await;

        assert!(matches!(result, Err(CameraError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_inactive_stream_is_reported_as_device_unavailable() {
        let checker = CapabilityChecker::new(Arc::new(MockCamera::granting(false)));

        let result = checker.enable_capture(DeviceClass::Desktop).await;

        assert!(matches!(result, Err(CameraError::DeviceUnavailable(_))));
    }
}
