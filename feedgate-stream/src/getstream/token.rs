//! Server-side JWT for the Feeds REST API.
//!
//! The provider authenticates backend callers with an HS256 token signed by
//! the API secret. A wildcard token (`resource`, `action` and `feed_id` all
//! `*`) grants every feed and reaction operation, and it has no expiry, so
//! the client mints it once at construction.

use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use super::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerClaims {
    pub resource: String,
    pub action: String,
    pub feed_id: String,
}

impl ServerClaims {
    pub fn wildcard() -> Self {
        Self {
            resource: "*".into(),
            action: "*".into(),
            feed_id: "*".into(),
        }
    }
}

pub fn server_token(api_secret: &str) -> Result<String, ProviderError> {
    if api_secret.trim().is_empty() {
        return Err(ProviderError::Credentials("API secret is empty".into()));
    }
    encode(
        &Header::default(),
        &ServerClaims::wildcard(),
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
    .map_err(|e| ProviderError::Credentials(format!("failed to sign server token: {e}")))
}
