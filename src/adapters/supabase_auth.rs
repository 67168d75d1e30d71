use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapters::supabase_errors::failure_message;
use crate::core::errors::AuthError;
use crate::core::interfaces::adapters::IdentityProvider;
use crate::core::models::Identity;
use crate::global_constants::{
    ENV_SCANNER_EMAIL, ENV_SCANNER_PASSWORD, ENV_SUPABASE_ACCESS_TOKEN,
};

/// How the scanner proves who is scanning.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionCredentials {
    None,
    AccessToken(String),
    Password { email: String, password: String },
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionCredentials::None => write!(f, "None"),
            SessionCredentials::AccessToken(_) => write!(f, "AccessToken(<redacted>)"),
            SessionCredentials::Password { email, .. } => {
                write!(f, "Password {{ email: {:?}, password: <redacted> }}", email)
            }
        }
    }
}

/// A ready token wins over an email/password pair.
pub fn credentials_from_environment(lookup: impl Fn(&str) -> Option<String>) -> SessionCredentials {
    let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(token) = present(ENV_SUPABASE_ACCESS_TOKEN) {
        return SessionCredentials::AccessToken(token);
    }

    match (present(ENV_SCANNER_EMAIL), present(ENV_SCANNER_PASSWORD)) {
        (Some(email), Some(password)) => SessionCredentials::Password { email, password },
        _ => SessionCredentials::None,
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    credentials: SessionCredentials,
    signed_in: Mutex<Option<Identity>>,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: &str, credentials: SessionCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            credentials,
            signed_in: Mutex::new(None),
        }
    }

    async fn user_for_token(&self, access_token: &str) -> Result<Identity, AuthError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(access_token)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|error| AuthError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| AuthError::Transport(error.to_string()))?;

        if !status.is_success() {
            log::warn!("[SUPABASE_AUTH] Session rejected ({})", status);
            return Err(AuthError::Rejected(failure_message(status.as_u16(), &body)));
        }

        let user: UserResponse = serde_json::from_str(&body)
            .map_err(|error| AuthError::Rejected(format!("unexpected user payload: {}", error)))?;

        Ok(Identity::new(user.id, access_token))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        log::info!("[SUPABASE_AUTH] Signing in as {}", email);

        let response = self
            .http
            .post(format!("{}/auth/v1/token?grant_type=password", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|error| AuthError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| AuthError::Transport(error.to_string()))?;

        if !status.is_success() {
            log::warn!("[SUPABASE_AUTH] Sign-in rejected ({})", status);
            return Err(AuthError::Rejected(failure_message(status.as_u16(), &body)));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|error| AuthError::Rejected(format!("unexpected token payload: {}", error)))?;

        Ok(Identity::new(token.user.id, token.access_token))
    }

    fn cached_identity(&self) -> Option<Identity> {
        self.signed_in.lock().ok().and_then(|cached| cached.clone())
    }

    fn remember(&self, identity: &Identity) {
        if let Ok(mut cached) = self.signed_in.lock() {
            *cached = Some(identity.clone());
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn current_identity(&self) -> Result<Identity, AuthError> {
        let identity = match &self.credentials {
            SessionCredentials::None => {
                log::warn!("[SUPABASE_AUTH] No session credentials configured");
                return Err(AuthError::NotSignedIn);
            }
            SessionCredentials::AccessToken(token) => self.user_for_token(token).await?,
            SessionCredentials::Password { email, password } => match self.cached_identity() {
                Some(cached) => match self.user_for_token(&cached.access_token).await {
                    Ok(identity) => identity,
                    Err(AuthError::Rejected(_)) => self.sign_in_with_password(email, password).await?,
                    Err(error) => return Err(error),
                },
                None => self.sign_in_with_password(email, password).await?,
            },
        };

        log::info!("[SUPABASE_AUTH] Session belongs to {}", identity.user_id);
        self.remember(&identity);
        Ok(identity)
    }
}
