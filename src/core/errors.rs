use thiserror::Error;

use crate::global_constants::{
    USER_MESSAGE_CANCELLED, USER_MESSAGE_CAPTURE_FAILED, USER_MESSAGE_DEVICE_UNAVAILABLE,
    USER_MESSAGE_EXTRACTION_FAILED, USER_MESSAGE_INVALID_ADDRESS,
    USER_MESSAGE_INVALID_PROVIDER_RESPONSE, USER_MESSAGE_MISCONFIGURED,
    USER_MESSAGE_NOT_SIGNED_IN, USER_MESSAGE_NO_TEXT_DETECTED, USER_MESSAGE_PERMISSION_DENIED,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no active video stream")]
    NoActiveStream,
    #[error("the stream is showing a previously captured still")]
    StillShowing,
    #[error("the camera returned no frame data")]
    EmptyFrame,
    #[error("failed to read a frame from the camera: {0}")]
    Device(String),
    #[error("failed to encode the frame: {0}")]
    Encoding(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("upload of {storage_key} failed: {reason}")]
pub struct PublishError {
    pub storage_key: String,
    pub reason: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no signed-in user")]
    NotSignedIn,
    #[error("the auth service rejected the session: {0}")]
    Rejected(String),
    #[error("could not reach the auth service: {0}")]
    Transport(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("invalid image address {address:?}: {reason}")]
    InvalidInput { address: String, reason: String },
    #[error("text extraction is not configured: {0}")]
    Misconfigured(String),
    #[error("invalid response from OCR provider: {0}")]
    InvalidProviderResponse(String),
    #[error("OCR provider failed (HTTP {http_status}): {message}")]
    ExtractionFailed {
        message: String,
        http_status: u16,
        raw_payload: serde_json::Value,
    },
    #[error("OCR provider found no text")]
    NoTextDetected { raw_payload: serde_json::Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    DeviceUnavailable,
    Capture,
    Unauthenticated,
    Publish,
    InvalidInput,
    Misconfigured,
    InvalidProviderResponse,
    ExtractionFailed,
    NoTextDetected,
    Cancelled,
}

/// Every way a capture session can end in failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Unauthenticated(#[from] AuthError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("cancelled while {stage}")]
    Cancelled { stage: &'static str },
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Camera(CameraError::PermissionDenied(_)) => FailureKind::PermissionDenied,
            PipelineError::Camera(CameraError::DeviceUnavailable(_)) => {
                FailureKind::DeviceUnavailable
            }
            PipelineError::Capture(_) => FailureKind::Capture,
            PipelineError::Unauthenticated(_) => FailureKind::Unauthenticated,
            PipelineError::Publish(_) => FailureKind::Publish,
            PipelineError::Extraction(error) => match error {
                ExtractionError::InvalidInput { .. } => FailureKind::InvalidInput,
                ExtractionError::Misconfigured(_) => FailureKind::Misconfigured,
                ExtractionError::InvalidProviderResponse(_) => FailureKind::InvalidProviderResponse,
                ExtractionError::ExtractionFailed { .. } => FailureKind::ExtractionFailed,
                ExtractionError::NoTextDetected { .. } => FailureKind::NoTextDetected,
            },
            PipelineError::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    /// The one short message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Camera(CameraError::PermissionDenied(_)) => {
                USER_MESSAGE_PERMISSION_DENIED.to_string()
            }
            PipelineError::Camera(CameraError::DeviceUnavailable(_)) => {
                USER_MESSAGE_DEVICE_UNAVAILABLE.to_string()
            }
            PipelineError::Capture(_) => USER_MESSAGE_CAPTURE_FAILED.to_string(),
            PipelineError::Unauthenticated(AuthError::NotSignedIn) => {
                USER_MESSAGE_NOT_SIGNED_IN.to_string()
            }
            PipelineError::Unauthenticated(AuthError::Rejected(reason))
            | PipelineError::Unauthenticated(AuthError::Transport(reason)) => {
                format!("Authentication error: {}", reason)
            }
            PipelineError::Publish(error) => format!("Failed to upload image: {}", error.reason),
            PipelineError::Extraction(error) => match error {
                ExtractionError::InvalidInput { .. } => USER_MESSAGE_INVALID_ADDRESS.to_string(),
                ExtractionError::Misconfigured(_) => USER_MESSAGE_MISCONFIGURED.to_string(),
                ExtractionError::InvalidProviderResponse(_) => {
                    USER_MESSAGE_INVALID_PROVIDER_RESPONSE.to_string()
                }
                ExtractionError::ExtractionFailed { message, .. } if !message.trim().is_empty() => {
                    message.clone()
                }
                ExtractionError::ExtractionFailed { .. } => {
                    USER_MESSAGE_EXTRACTION_FAILED.to_string()
                }
                ExtractionError::NoTextDetected { .. } => USER_MESSAGE_NO_TEXT_DETECTED.to_string(),
            },
            PipelineError::Cancelled { .. } => USER_MESSAGE_CANCELLED.to_string(),
        }
    }

    /// Internal detail for the diagnostic trace, including provider payloads.
    pub fn diagnostic_detail(&self) -> String {
        match self {
            PipelineError::Extraction(ExtractionError::ExtractionFailed { raw_payload, .. })
            | PipelineError::Extraction(ExtractionError::NoTextDetected { raw_payload }) => {
                format!("{} | provider payload: {}", self, raw_payload)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camera_errors_have_distinct_user_messages() {
        let denied = PipelineError::from(CameraError::PermissionDenied("NotAllowed".into()));
        let missing = PipelineError::from(CameraError::DeviceUnavailable("no device".into()));

        assert_ne!(denied.user_message(), missing.user_message());
        assert!(denied.user_message().contains("settings"));
        assert!(missing.user_message().contains("working camera"));
    }

    #[test]
    fn test_extraction_failed_uses_provider_message_verbatim() {
        let error = PipelineError::from(ExtractionError::ExtractionFailed {
            message: "File failed validation. File size exceeds the maximum".into(),
            http_status: 200,
            raw_payload: json!({"OCRExitCode": 99}),
        });

        assert_eq!(
            error.user_message(),
            "File failed validation. File size exceeds the maximum"
        );
        assert_eq!(error.kind(), FailureKind::ExtractionFailed);
        assert!(error.diagnostic_detail().contains("OCRExitCode"));
    }

    #[test]
    fn test_extraction_failed_without_provider_message_falls_back() {
        let error = PipelineError::from(ExtractionError::ExtractionFailed {
            message: String::new(),
            http_status: 500,
            raw_payload: json!(null),
        });

        assert_eq!(error.user_message(), USER_MESSAGE_EXTRACTION_FAILED);
    }

    #[test]
    fn test_misconfigured_is_reported_as_configuration_fault() {
        let error = PipelineError::from(ExtractionError::Misconfigured("missing key".into()));

        assert_eq!(error.kind(), FailureKind::Misconfigured);
        assert!(error.user_message().contains("not configured"));
        assert!(error.diagnostic_detail().contains("missing key"));
    }

    #[test]
    fn test_no_text_detected_suggests_lighting_adjustment() {
        let error = PipelineError::from(ExtractionError::NoTextDetected {
            raw_payload: json!({}),
        });

        assert_eq!(error.kind(), FailureKind::NoTextDetected);
        assert!(error.user_message().contains("lighting"));
    }

    #[test]
    fn test_publish_error_message_carries_provider_reason() {
        let error = PipelineError::from(PublishError {
            storage_key: "user/scan_1.png".into(),
            reason: "new row violates row-level security policy".into(),
        });

        assert_eq!(
            error.user_message(),
            "Failed to upload image: new row violates row-level security policy"
        );
    }

    #[test]
    fn test_cancelled_kind() {
        let error = PipelineError::Cancelled { stage: "uploading" };

        assert_eq!(error.kind(), FailureKind::Cancelled);
        assert_eq!(error.diagnostic_detail(), "cancelled while uploading");
    }
}
