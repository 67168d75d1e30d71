use async_trait::async_trait;

use crate::core::errors::ExtractionError;
use crate::core::models::ExtractionResult;

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    async fn extract_text(&self, address: &str) -> Result<ExtractionResult, ExtractionError>;

    /// Reports configuration faults before any capture work starts.
    fn ensure_configured(&self) -> Result<(), ExtractionError> {
        Ok(())
    }
}
