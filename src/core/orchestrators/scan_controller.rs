use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::errors::PipelineError;
use crate::core::models::{CaptureOutcome, CaptureSession, DeviceClass};
use crate::core::orchestrators::scan_orchestrator::{ScanOrchestrator, StageGuard};
use crate::core::services::CapabilityGrant;

/// Identifies one started session; completions are matched against it.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    generation: u64,
    session_id: Uuid,
    cancel: CancellationToken,
}

impl SessionTicket {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Holds the latest session. Starting a new one cancels the previous one and
/// any late completion of an older session is thrown away.
#[derive(Debug, Default)]
pub struct SessionBoard {
    generation: u64,
    in_flight: Option<CancellationToken>,
    current: Option<CaptureSession>,
}

impl SessionBoard {
    pub fn begin(&mut self, session_id: Uuid) -> SessionTicket {
        self.cancel_in_flight();
        self.generation += 1;
        self.current = None;

        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());

        SessionTicket {
            generation: self.generation,
            session_id,
            cancel,
        }
    }

    /// Returns `false` when the ticket has been superseded.
    pub fn complete(&mut self, ticket: &SessionTicket, session: CaptureSession) -> bool {
        if ticket.generation != self.generation {
            log::warn!(
                "[SCAN_CONTROLLER] Discarding stale session {} (generation {} < {})",
                ticket.session_id,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.in_flight = None;
        self.current = Some(session);
        true
    }

    pub fn clear(&mut self) {
        self.cancel_in_flight();
        self.generation += 1;
        self.current = None;
    }

    pub fn current(&self) -> Option<&CaptureSession> {
        self.current.as_ref()
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

enum PendingWork {
    Finished(CaptureSession),
    Running(JoinHandle<CaptureSession>),
}

/// A capture whose network stages may still be running in the background.
pub struct PendingCapture {
    ticket: SessionTicket,
    work: PendingWork,
}

impl PendingCapture {
    pub fn ticket(&self) -> &SessionTicket {
        &self.ticket
    }
}

/// The unit a user action talks to: owns the camera grant and the latest
/// session.
pub struct ScanController {
    orchestrator: Arc<ScanOrchestrator>,
    device_class: DeviceClass,
    camera: Option<CapabilityGrant>,
    board: SessionBoard,
    deadline: Option<Duration>,
}

impl ScanController {
    pub fn new(orchestrator: Arc<ScanOrchestrator>, device_class: DeviceClass) -> Self {
        Self {
            orchestrator,
            device_class,
            camera: None,
            board: SessionBoard::default(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn camera_enabled(&self) -> bool {
        self.camera.as_ref().is_some_and(|grant| grant.is_active())
    }

    pub async fn enable_camera(&mut self) -> Result<(), PipelineError> {
        let grant = self.orchestrator.enable_camera(self.device_class).await?;
        log::info!("[SCAN_CONTROLLER] Camera enabled: {}", grant.describe());
        self.camera = Some(grant);
        Ok(())
    }

    /// Runs the camera stages now and hands the network stages to a
    /// background task.
    pub async fn start_capture(&mut self) -> PendingCapture {
        let mut session = CaptureSession::new();
        let ticket = self.board.begin(session.id());

        let mut guard = StageGuard::new(ticket.cancel.clone());
        if let Some(deadline) = self.deadline {
            guard = guard.with_deadline(deadline);
        }

        let acquired = self
            .orchestrator
            .acquire_frame(&mut session, &mut self.camera, self.device_class, &guard)
            .await;

        let work = if acquired {
            let orchestrator = Arc::clone(&self.orchestrator);
            PendingWork::Running(tokio::spawn(orchestrator.process_owned(session, guard)))
        } else {
            PendingWork::Finished(session)
        };

        PendingCapture { ticket, work }
    }

    /// Waits for the capture and records it, unless a newer capture or a
    /// retake has superseded it in the meantime.
    pub async fn finish_capture(&mut self, pending: PendingCapture) -> Option<CaptureOutcome> {
        let session = match pending.work {
            PendingWork::Finished(session) => session,
            PendingWork::Running(handle) => match handle.await {
                Ok(session) => session,
                Err(error) => {
                    log::error!(
                        "[SCAN_CONTROLLER] Capture task for session {} did not finish: {}",
                        pending.ticket.session_id,
                        error
                    );
                    return None;
                }
            },
        };

        let outcome = session.outcome();
        if self.board.complete(&pending.ticket, session) {
            outcome
        } else {
            None
        }
    }

    pub async fn capture(&mut self) -> Option<CaptureOutcome> {
        let pending = self.start_capture().await;
        self.finish_capture(pending).await
    }

    /// Drops the last result and trace and returns the camera to live preview.
    pub fn retake(&mut self) {
        log::info!("[SCAN_CONTROLLER] Retake requested");
        self.board.clear();
        if let Some(grant) = self.camera.as_mut() {
            grant.resume_preview();
        }
    }

    pub fn current_session(&self) -> Option<&CaptureSession> {
        self.board.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{CameraError, FailureKind};
    use crate::core::models::SessionState;
    use crate::core::orchestrators::scan_orchestrator::tests::{
        FakeCamera, Fixture, ProviderScript,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn controller_for(fixture: &Fixture) -> ScanController {
        ScanController::new(Arc::new(fixture.orchestrator()), DeviceClass::Mobile)
    }

    #[test]
    fn test_board_discards_completion_of_superseded_session() {
        let mut board = SessionBoard::default();
        let older = CaptureSession::new();
        let newer = CaptureSession::new();
        let newer_id = newer.id();

        let older_ticket = board.begin(older.id());
        let newer_ticket = board.begin(newer_id);

        assert!(older_ticket.is_cancelled());
        assert!(!newer_ticket.is_cancelled());
        assert!(board.complete(&newer_ticket, newer));
        assert!(!board.complete(&older_ticket, older));
        assert_eq!(board.current().unwrap().id(), newer_id);
    }

    #[test]
    fn test_board_clear_cancels_and_invalidates_in_flight_session() {
        let mut board = SessionBoard::default();
        let session = CaptureSession::new();
        let ticket = board.begin(session.id());

        board.clear();

        assert!(ticket.is_cancelled());
        assert!(!board.complete(&ticket, session));
        assert!(board.current().is_none());
    }

    #[tokio::test]
    async fn test_capture_records_session_and_trace() {
        let fixture = Fixture::new(ProviderScript::Text("2+2=4"));
        let mut controller = controller_for(&fixture);

        let outcome = controller.capture().await;

        assert_eq!(outcome, Some(CaptureOutcome::Text("2+2=4".to_string())));
        let session = controller.current_session().unwrap();
        assert_eq!(session.state(), SessionState::Extracted);
        assert!(!session.trace().is_empty());
        assert!(controller.camera_enabled());
    }

    #[tokio::test]
    async fn test_second_capture_without_retake_fails_on_frozen_still() {
        let fixture = Fixture::new(ProviderScript::Text("first"));
        let mut controller = controller_for(&fixture);
        controller.capture().await;

        let outcome = controller.capture().await;

        assert!(matches!(outcome, Some(CaptureOutcome::Error(_))));
        assert_eq!(
            controller.current_session().unwrap().state(),
            SessionState::Failed(FailureKind::Capture)
        );
    }

    #[tokio::test]
    async fn test_retake_clears_result_and_allows_new_capture() {
        let fixture = Fixture::new(ProviderScript::Text("again"));
        let mut controller = controller_for(&fixture);
        controller.capture().await;

        controller.retake();
        assert!(controller.current_session().is_none());

        let outcome = controller.capture().await;
        assert_eq!(outcome, Some(CaptureOutcome::Text("again".to_string())));
        assert_eq!(fixture.camera.opened.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.uploads(), 2);
    }

    #[tokio::test]
    async fn test_retake_during_flight_discards_stale_completion() {
        let fixture = Fixture::new(ProviderScript::Slow);
        let mut controller = controller_for(&fixture);

        let stale = controller.start_capture().await;
        controller.retake();
        let outcome = controller.finish_capture(stale).await;

        assert_eq!(outcome, None);
        assert!(controller.current_session().is_none());
    }

    #[tokio::test]
    async fn test_newer_capture_wins_over_older_in_flight_capture() {
        let fixture = Fixture::new(ProviderScript::Text("newest"));
        let mut controller = controller_for(&fixture);

        let older = controller.start_capture().await;
        controller.retake();
        let newer = controller.start_capture().await;
        let newer_id = newer.ticket().session_id();

        let newer_outcome = controller.finish_capture(newer).await;
        let older_outcome = controller.finish_capture(older).await;

        assert_eq!(newer_outcome, Some(CaptureOutcome::Text("newest".to_string())));
        assert_eq!(older_outcome, None);
        assert_eq!(controller.current_session().unwrap().id(), newer_id);
    }

    #[tokio::test]
    async fn test_deadline_leaves_session_cancelled() {
        let fixture = Fixture::new(ProviderScript::Slow);
        let mut controller = controller_for(&fixture).with_deadline(Duration::from_millis(50));

        let outcome = controller.capture().await;

        assert!(matches!(outcome, Some(CaptureOutcome::Error(_))));
        assert_eq!(
            controller.current_session().unwrap().state(),
            SessionState::Failed(FailureKind::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_enable_camera_surfaces_camera_failure() {
        let mut fixture = Fixture::new(ProviderScript::Text("unused"));
        fixture.camera = Arc::new(FakeCamera {
            opened: AtomicUsize::new(0),
            failure: Some(CameraError::DeviceUnavailable("no camera".to_string())),
        });
        let mut controller = controller_for(&fixture);

        let result = controller.enable_camera().await;

        assert_eq!(result.unwrap_err().kind(), FailureKind::DeviceUnavailable);
        assert!(!controller.camera_enabled());
    }
}
