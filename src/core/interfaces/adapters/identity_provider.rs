use async_trait::async_trait;

use crate::core::errors::AuthError;
use crate::core::models::Identity;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> Result<Identity, AuthError>;
}
