use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    credentials_from_environment, HttpReachabilityProber, OcrSpaceClient, SessionCredentials, SupabaseAuth,
    SupabaseStorage, UnconfiguredTextExtraction,
};
use crate::core::interfaces::adapters::{TextClipboard, TextExtractionService};
use crate::core::interfaces::ports::CameraDevice;
use crate::core::models::{CaptureOutcome, CaptureSession, DeviceClass, ScannerSettings, SessionState};
use crate::core::orchestrators::{ScanController, ScanOrchestrator};
use crate::core::services::{BlobPublisher, CapabilityChecker};
use crate::global_constants::{ENV_OCR_API_KEY, LOG_TAG_APP};
use crate::ports::{StillImageCamera, SystemClipboard, XcapCamera};

/// Where frames come from for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    Photo(PathBuf),
    Screen,
}

impl CaptureSource {
    fn camera(&self) -> Arc<dyn CameraDevice> {
        match self {
            CaptureSource::Photo(path) => Arc::new(StillImageCamera::new(path.clone())),
            CaptureSource::Screen => Arc::new(XcapCamera::initialize()),
        }
    }
}

/// What a finished scan leaves behind for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub outcome: Option<CaptureOutcome>,
    pub state: Option<SessionState>,
    pub trace: Vec<String>,
}

impl ScanReport {
    fn from_session(outcome: Option<CaptureOutcome>, session: Option<&CaptureSession>) -> Self {
        Self {
            outcome,
            state: session.map(CaptureSession::state),
            trace: session
                .map(|session| {
                    session
                        .trace()
                        .entries()
                        .iter()
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn failed(&self) -> bool {
        !matches!(self.outcome, Some(CaptureOutcome::Text(_)))
    }
}

pub struct ScannerApp {
    controller: ScanController,
    clipboard: Arc<dyn TextClipboard>,
}

impl ScannerApp {
    pub fn build(
        settings: &ScannerSettings,
        source: &CaptureSource,
        device_class: DeviceClass,
        deadline: Option<Duration>,
    ) -> Self {
        let lookup = |name: &str| std::env::var(name).ok();
        Self::build_with(
            settings,
            source,
            device_class,
            deadline,
            lookup(ENV_OCR_API_KEY),
            credentials_from_environment(lookup),
        )
    }

    fn build_with(
        settings: &ScannerSettings,
        source: &CaptureSource,
        device_class: DeviceClass,
        deadline: Option<Duration>,
        ocr_api_key: Option<String>,
        credentials: SessionCredentials,
    ) -> Self {
        log::info!("{} Initializing scanner for {:?}", LOG_TAG_APP, source);

        if settings.supabase_url.trim().is_empty() {
            log::warn!(
                "{} Storage URL is not configured; sign-in and upload will fail",
                LOG_TAG_APP
            );
        }

        let identity_provider = Arc::new(SupabaseAuth::new(
            &settings.supabase_url,
            &settings.supabase_anon_key,
            credentials,
        ));
        let storage = Arc::new(SupabaseStorage::new(
            &settings.supabase_url,
            &settings.supabase_anon_key,
            &settings.storage_bucket,
        ));

        let orchestrator = ScanOrchestrator::build(
            CapabilityChecker::new(source.camera()),
            identity_provider,
            BlobPublisher::new(storage, Duration::from_secs(settings.cache_ttl_seconds)),
            Arc::new(HttpReachabilityProber::new()),
            text_extraction_for(settings, ocr_api_key),
        );

        let mut controller = ScanController::new(Arc::new(orchestrator), device_class);
        if let Some(deadline) = deadline {
            controller = controller.with_deadline(deadline);
        }

        Self {
            controller,
            clipboard: Arc::new(SystemClipboard),
        }
    }

    pub async fn scan(&mut self) -> ScanReport {
        let outcome = self.controller.capture().await;
        ScanReport::from_session(outcome, self.controller.current_session())
    }

    pub fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()> {
        self.clipboard.copy_text(text)
    }
}

fn text_extraction_for(
    settings: &ScannerSettings,
    api_key: Option<String>,
) -> Arc<dyn TextExtractionService> {
    match OcrSpaceClient::with_credential(&settings.ocr_endpoint, api_key) {
        Ok(client) => {
            log::info!("{} OCR service initialized successfully", LOG_TAG_APP);
            Arc::new(client)
        }
        Err(error) => {
            log::error!("{} Failed to initialize OCR service: {}", LOG_TAG_APP, error);
            Arc::new(UnconfiguredTextExtraction::new(error.to_string()))
        }
    }
}
