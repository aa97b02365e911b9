use feedgate_http::HttpError;
use thiserror::Error;

/// Failure of a single provider call.
///
/// `Display` is what callers surface to clients, so provider API failures
/// render as the provider's own message with nothing prepended.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid feed id {slug}:{user_id}: only letters, digits, '_' and '-' are allowed")]
    InvalidFeed { slug: String, user_id: String },

    #[error("invalid provider credentials: {0}")]
    Credentials(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Transport(HttpError),
}

impl From<HttpError> for ProviderError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Api {
                status, message, ..
            } => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
            other => ProviderError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn api_errors_display_only_the_provider_message() {
        let err: ProviderError = HttpError::Api {
            status: StatusCode::FORBIDDEN,
            message: "signature is invalid".into(),
            request_id: "abc".into(),
        }
        .into();
        assert!(matches!(err, ProviderError::Api { status: 403, .. }));
        assert_eq!(err.to_string(), "signature is invalid");
    }

    #[test]
    fn transport_errors_keep_their_context() {
        let err: ProviderError = HttpError::Network("connection refused".into()).into();
        assert_eq!(err.to_string(), "network error: connection refused");
    }
}
