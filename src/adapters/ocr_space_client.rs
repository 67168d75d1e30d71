use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::core::errors::ExtractionError;
use crate::core::interfaces::adapters::TextExtractionService;
use crate::core::models::ExtractionResult;
use crate::global_constants::{
    DEFAULT_OCR_LANGUAGE, ENV_OCR_API_KEY, LOG_PREVIEW_LIMIT, PROVIDER_SUCCESS_EXIT_CODE,
};

#[derive(Debug, Default, Deserialize)]
struct OcrSpaceResponse {
    #[serde(rename = "OCRExitCode")]
    ocr_exit_code: Option<i64>,
    #[serde(rename = "ParsedResults")]
    parsed_results: Option<Vec<OcrSpaceParsedResult>>,
    #[serde(rename = "ErrorMessage")]
    error_message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OcrSpaceParsedResult {
    #[serde(rename = "ParsedText")]
    parsed_text: Option<String>,
}

impl OcrSpaceResponse {
    /// OCR.space sends `ErrorMessage` either as a string or a list of strings.
    fn error_message_text(&self) -> String {
        match &self.error_message {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Array(messages)) => messages
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            _ => String::new(),
        }
    }

    fn first_parsed_text(&self) -> String {
        self.parsed_results
            .as_ref()
            .and_then(|results| results.first())
            .and_then(|result| result.parsed_text.clone())
            .unwrap_or_default()
    }
}

pub struct OcrSpaceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OcrSpaceClient {
    pub fn from_environment(endpoint: &str) -> Result<Self, ExtractionError> {
        Self::with_credential(endpoint, std::env::var(ENV_OCR_API_KEY).ok())
    }

    pub fn with_credential(endpoint: &str, api_key: Option<String>) -> Result<Self, ExtractionError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ExtractionError::Misconfigured(format!("{} is not set", ENV_OCR_API_KEY))
            })?;

        log::info!("[OCR_SPACE] Client configured for {}", endpoint);

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    fn validate_address(address: &str) -> Result<reqwest::Url, ExtractionError> {
        let invalid = |reason: &str| ExtractionError::InvalidInput {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let url = reqwest::Url::parse(address).map_err(|error| invalid(&error.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("only http and https addresses can be fetched"));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("address has no host"));
        }
        Ok(url)
    }

    fn build_form(&self, image_url: &reqwest::Url) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new()
            .text("apikey", self.api_key.clone())
            .text("url", image_url.to_string())
            .text("language", DEFAULT_OCR_LANGUAGE)
            .text("isOverlayRequired", "false")
            .text("scale", "true")
            .text("isTable", "true")
    }

    /// Turns a provider reply into a result. Non-2xx or an exit code other
    /// than 1 is a failure even when the body parses.
    fn interpret_response(http_status: u16, body: &str) -> Result<ExtractionResult, ExtractionError> {
        let payload: Value = serde_json::from_str(body).map_err(|error| {
            ExtractionError::InvalidProviderResponse(format!("response body is not JSON: {}", error))
        })?;
        let response: OcrSpaceResponse =
            serde_json::from_value(payload.clone()).unwrap_or_default();

        let transport_ok = (200..300).contains(&http_status);
        let exit_code = response.ocr_exit_code;
        if !transport_ok || exit_code != Some(PROVIDER_SUCCESS_EXIT_CODE) {
            let message = match &payload {
                Value::String(message) => message.clone(),
                _ => response.error_message_text(),
            };
            log::error!(
                "[OCR_SPACE] Provider failure: HTTP {}, exit code {:?}, message {:?}",
                http_status,
                exit_code,
                message
            );
            return Err(ExtractionError::ExtractionFailed {
                message,
                http_status,
                raw_payload: payload,
            });
        }

        let text = response.first_parsed_text();
        let result = ExtractionResult::from_provider(PROVIDER_SUCCESS_EXIT_CODE, text, payload);
        if !result.success {
            log::warn!("[OCR_SPACE] Provider returned no text");
            return Err(ExtractionError::NoTextDetected {
                raw_payload: result.raw_payload,
            });
        }

        log::debug!("[OCR_SPACE] Extracted text: {}", preview(&result.text));
        Ok(result)
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= LOG_PREVIEW_LIMIT {
        return text.to_string();
    }
    let truncated: String = text.chars().take(LOG_PREVIEW_LIMIT).collect();
    format!("{}...", truncated)
}

#[async_trait]
impl TextExtractionService for OcrSpaceClient {
    async fn extract_text(&self, address: &str) -> Result<ExtractionResult, ExtractionError> {
        let image_url = Self::validate_address(address)?;

        log::info!("[OCR_SPACE] Submitting {} for recognition", image_url);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(self.build_form(&image_url))
            .send()
            .await
            .map_err(|error| {
                ExtractionError::InvalidProviderResponse(format!("no response from provider: {}", error))
            })?;

        let status = response.status();
        log::info!("[OCR_SPACE] Response status: {}", status);

        let body = response.text().await.map_err(|error| {
            ExtractionError::InvalidProviderResponse(format!("could not read response body: {}", error))
        })?;
        log::debug!("[OCR_SPACE] Raw response: {}", preview(&body));

        Self::interpret_response(status.as_u16(), &body)
    }
}

/// Stand-in wired at boot when the OCR credential is missing; every capture
/// fails with `Misconfigured` before touching the camera or the network.
pub struct UnconfiguredTextExtraction {
    reason: String,
}

impl UnconfiguredTextExtraction {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextExtractionService for UnconfiguredTextExtraction {
    async fn extract_text(&self, _address: &str) -> Result<ExtractionResult, ExtractionError> {
        Err(ExtractionError::Misconfigured(self.reason.clone()))
    }

    fn ensure_configured(&self) -> Result<(), ExtractionError> {
        Err(ExtractionError::Misconfigured(self.reason.clone()))
    }
}
