use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::errors::{CaptureError, PipelineError};
use crate::core::interfaces::adapters::{
    IdentityProvider, Reachability, ReachabilityProber, TextExtractionService,
};
use crate::core::models::{CaptureSession, DeviceClass, SessionState};
use crate::core::services::{BlobPublisher, CapabilityChecker, CapabilityGrant, FrameCapturer};

/// Cancellation and optional deadline shared by every stage of one session.
#[derive(Debug, Clone)]
pub struct StageGuard {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl StageGuard {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, budget: Duration) -> Self {
        self.deadline = Some(Instant::now() + budget);
        self
    }

    fn check(&self, stage: &'static str) -> Result<(), PipelineError> {
        let expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if self.cancel.is_cancelled() || expired {
            return Err(PipelineError::Cancelled { stage });
        }
        Ok(())
    }

    async fn run<F: Future>(&self, stage: &'static str, work: F) -> Result<F::Output, PipelineError> {
        self.check(stage)?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PipelineError::Cancelled { stage }),
            _ = deadline => Err(PipelineError::Cancelled { stage }),
            output = work => Ok(output),
        }
    }
}

/// Runs one capture session through camera, upload, probe and OCR, one
/// stage at a time.
pub struct ScanOrchestrator {
    capability_checker: CapabilityChecker,
    frame_capturer: FrameCapturer,
    identity_provider: Arc<dyn IdentityProvider>,
    blob_publisher: BlobPublisher,
    reachability_prober: Arc<dyn ReachabilityProber>,
    text_extraction: Arc<dyn TextExtractionService>,
}

impl ScanOrchestrator {
    pub fn build(
        capability_checker: CapabilityChecker,
        identity_provider: Arc<dyn IdentityProvider>,
        blob_publisher: BlobPublisher,
        reachability_prober: Arc<dyn ReachabilityProber>,
        text_extraction: Arc<dyn TextExtractionService>,
    ) -> Self {
        Self {
            capability_checker,
            frame_capturer: FrameCapturer::new(),
            identity_provider,
            blob_publisher,
            reachability_prober,
            text_extraction,
        }
    }

    pub async fn enable_camera(
        &self,
        device_class: DeviceClass,
    ) -> Result<CapabilityGrant, PipelineError> {
        Ok(self.capability_checker.enable_capture(device_class).await?)
    }

    /// Runs every stage for a fresh session and returns it in a terminal state.
    pub async fn run_capture(
        &self,
        camera: &mut Option<CapabilityGrant>,
        device_class: DeviceClass,
        guard: &StageGuard,
    ) -> CaptureSession {
        let mut session = CaptureSession::new();
        if self
            .acquire_frame(&mut session, camera, device_class, guard)
            .await
        {
            self.process_frame(&mut session, guard).await;
        }
        session
    }

    /// Camera stages. Returns `false` once the session has failed.
    pub async fn acquire_frame(
        &self,
        session: &mut CaptureSession,
        camera: &mut Option<CapabilityGrant>,
        device_class: DeviceClass,
        guard: &StageGuard,
    ) -> bool {
        log::info!("[ORCHESTRATOR] Starting capture session {}", session.id());

        if let Err(error) = self.text_extraction.ensure_configured() {
            session.fail(error.into());
            return false;
        }

        let needs_camera = !matches!(camera.as_ref(), Some(grant) if grant.is_active());
        if needs_camera {
            session.note(format!("Requesting camera access ({} device)...", device_class));
            let Some(grant) = run_stage(
                session,
                guard,
                "requesting camera access",
                self.capability_checker.enable_capture(device_class),
            )
            .await
            else {
                return false;
            };
            session.advance(
                SessionState::CapabilityGranted,
                format!("Camera permission granted: {}", grant.describe()),
            );
            *camera = Some(grant);
        } else if let Some(grant) = camera.as_ref() {
            session.advance(
                SessionState::CapabilityGranted,
                format!("Camera already active: {}", grant.describe()),
            );
        }

        if let Err(error) = guard.check("taking the still") {
            session.fail(error);
            return false;
        }

        session.note("Taking still from video stream...");
        let frame = match self.frame_capturer.capture_frame(camera.as_mut()) {
            Ok(frame) => frame,
            Err(error) => {
                session.fail(error.into());
                return false;
            }
        };

        let message = format!(
            "Frame captured: {}x{}, {:.2} KB",
            frame.width,
            frame.height,
            frame.size_in_bytes() as f64 / 1024.0
        );
        session.attach_frame(frame, Utc::now());
        session.advance(SessionState::Captured, message);
        true
    }

    /// Network stages: identity, publish, probe, extract.
    pub async fn process_frame(&self, session: &mut CaptureSession, guard: &StageGuard) {
        session.note("Resolving signed-in user...");
        let Some(identity) = run_stage(
            session,
            guard,
            "resolving the signed-in user",
            self.identity_provider.current_identity(),
        )
        .await
        else {
            return;
        };
        session.note(format!("User authenticated: {}", identity.user_id));
        session.set_identity(identity.clone());

        let Some(frame) = session.take_frame() else {
            session.fail(CaptureError::EmptyFrame.into());
            return;
        };
        let captured_at = session.captured_at().unwrap_or_else(Utc::now);
        session.note(format!(
            "Uploading to storage as {}",
            BlobPublisher::storage_key_for(&identity, captured_at)
        ));

        let Some(published) = run_stage(
            session,
            guard,
            "uploading the image",
            self.blob_publisher.publish(&identity, frame, captured_at),
        )
        .await
        else {
            return;
        };
        let address = published.public_address.clone();
        session.set_published(published);
        session.advance(
            SessionState::Published,
            format!("Image uploaded, public address: {}", address),
        );

        session.note("Checking image reachability...");
        let reachability = match guard
            .run(
                "checking image reachability",
                self.reachability_prober.probe(&address),
            )
            .await
        {
            Ok(reachability) => reachability,
            Err(error) => {
                session.fail(error);
                return;
            }
        };
        match reachability {
            Reachability::Reachable => {
                session.advance(SessionState::Probed, "Image is publicly reachable");
            }
            Reachability::Unreachable { reason } => {
                session.note_advisory(format!(
                    "image reachability check failed ({}), continuing with OCR anyway",
                    reason
                ));
                session.advance(SessionState::Probed, "Reachability check finished");
            }
        }

        session.note("Calling OCR service...");
        let Some(extraction) = run_stage(
            session,
            guard,
            "extracting text",
            self.text_extraction.extract_text(&address),
        )
        .await
        else {
            return;
        };
        let message = format!("Text detected ({} characters)", extraction.text.chars().count());
        session.set_extraction(extraction);
        session.advance(SessionState::Extracted, message);

        log::info!("[ORCHESTRATOR] Capture session {} complete", session.id());
    }

    pub async fn process_owned(
        self: Arc<Self>,
        mut session: CaptureSession,
        guard: StageGuard,
    ) -> CaptureSession {
        self.process_frame(&mut session, &guard).await;
        session
    }
}

/// Awaits one stage under the guard; on any failure the session is failed
/// and `None` comes back.
async fn run_stage<T, E, F>(
    session: &mut CaptureSession,
    guard: &StageGuard,
    stage: &'static str,
    work: F,
) -> Option<T>
where
    E: Into<PipelineError>,
    F: Future<Output = Result<T, E>>,
{
    match guard.run(stage, work).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            session.fail(error.into());
            None
        }
        Err(cancelled) => {
            session.fail(cancelled);
            None
        }
    }
}
