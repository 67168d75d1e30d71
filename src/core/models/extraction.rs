use crate::global_constants::PROVIDER_SUCCESS_EXIT_CODE;

/// Outcome of one call to the remote OCR provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub success: bool,
    pub text: String,
    pub raw_payload: serde_json::Value,
    pub provider_exit_code: i64,
}

impl ExtractionResult {
    /// Success requires both the provider's own success code and some
    /// non-blank text.
    pub fn from_provider(provider_exit_code: i64, text: String, raw_payload: serde_json::Value) -> Self {
        let success = provider_exit_code == PROVIDER_SUCCESS_EXIT_CODE && !text.trim().is_empty();

        Self {
            success,
            text,
            raw_payload,
            provider_exit_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_requires_provider_success_code_and_text() {
        let result = ExtractionResult::from_provider(1, "2+2=4".to_string(), json!({}));

        assert!(result.success);
        assert_eq!(result.text, "2+2=4");
    }

    #[test]
    fn test_blank_text_is_not_success() {
        let result = ExtractionResult::from_provider(1, "  \n\t ".to_string(), json!({}));

        assert!(!result.success);
    }

    #[test]
    fn test_failure_exit_code_is_not_success_even_with_text() {
        let result = ExtractionResult::from_provider(3, "partial".to_string(), json!({}));

        assert!(!result.success);
        assert_eq!(result.provider_exit_code, 3);
    }
}
