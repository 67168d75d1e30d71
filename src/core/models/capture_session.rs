use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::errors::{FailureKind, PipelineError};
use crate::core::models::{DiagnosticTrace, EncodedFrame, ExtractionResult, Identity, PublishedImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    CapabilityGranted,
    Captured,
    Published,
    Probed,
    Extracted,
    Failed(FailureKind),
}

impl SessionState {
    fn successor(self) -> Option<SessionState> {
        match self {
            SessionState::Idle => Some(SessionState::CapabilityGranted),
            SessionState::CapabilityGranted => Some(SessionState::Captured),
            SessionState::Captured => Some(SessionState::Published),
            SessionState::Published => Some(SessionState::Probed),
            SessionState::Probed => Some(SessionState::Extracted),
            SessionState::Extracted | SessionState::Failed(_) => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Extracted | SessionState::Failed(_))
    }
}

/// What the caller of a capture gets back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Text(String),
    Error(String),
}

/// One user-initiated capture attempt and everything it produced.
#[derive(Debug)]
pub struct CaptureSession {
    id: Uuid,
    state: SessionState,
    trace: DiagnosticTrace,
    captured_at: Option<DateTime<Utc>>,
    identity: Option<Identity>,
    frame: Option<EncodedFrame>,
    published: Option<PublishedImage>,
    extraction: Option<ExtractionResult>,
    failure: Option<PipelineError>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            trace: DiagnosticTrace::new(),
            captured_at: None,
            identity: None,
            frame: None,
            published: None,
            extraction: None,
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn trace(&self) -> &DiagnosticTrace {
        &self.trace
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn published(&self) -> Option<&PublishedImage> {
        self.published.as_ref()
    }

    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    pub fn failure(&self) -> Option<&PipelineError> {
        self.failure.as_ref()
    }

    pub fn holds_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn note(&mut self, message: impl Into<String>) {
        if !self.is_terminal() {
            self.trace.record(message);
        }
    }

    pub fn note_advisory(&mut self, message: impl AsRef<str>) {
        if !self.is_terminal() {
            self.trace.record_advisory(message);
        }
    }

    /// Moves to the next state in the fixed stage order. Out-of-order and
    /// post-terminal transitions are refused.
    pub fn advance(&mut self, next: SessionState, message: impl Into<String>) -> bool {
        if self.state.successor() != Some(next) {
            log::warn!(
                "[SESSION] {} refused transition {:?} -> {:?}",
                self.id,
                self.state,
                next
            );
            return false;
        }

        self.state = next;
        self.trace.record(message);
        true
    }

    pub fn attach_frame(&mut self, frame: EncodedFrame, captured_at: DateTime<Utc>) {
        self.frame = Some(frame);
        self.captured_at = Some(captured_at);
    }

    /// Hands the frame over; the session no longer holds the bytes afterwards.
    pub fn take_frame(&mut self) -> Option<EncodedFrame> {
        self.frame.take()
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    pub fn set_published(&mut self, published: PublishedImage) {
        self.published = Some(published);
    }

    pub fn set_extraction(&mut self, extraction: ExtractionResult) {
        self.extraction = Some(extraction);
    }

    /// Terminates the session. Only the first failure is recorded.
    pub fn fail(&mut self, error: PipelineError) {
        if self.is_terminal() {
            log::debug!(
                "[SESSION] {} already terminal, ignoring failure: {}",
                self.id,
                error
            );
            return;
        }

        self.trace.record_error(format!(
            "{} ({})",
            error.user_message(),
            error.diagnostic_detail()
        ));
        self.state = SessionState::Failed(error.kind());
        self.frame = None;
        self.failure = Some(error);
    }

    pub fn outcome(&self) -> Option<CaptureOutcome> {
        match self.state {
            SessionState::Extracted => self
                .extraction
                .as_ref()
                .map(|extraction| CaptureOutcome::Text(extraction.text.clone())),
            SessionState::Failed(_) => self
                .failure
                .as_ref()
                .map(|failure| CaptureOutcome::Error(failure.user_message())),
            _ => None,
        }
    }
}
