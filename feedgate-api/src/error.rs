use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedgate_stream::ProviderError;
use thiserror::Error;

use crate::envelope::Envelope;

/// Failure of a feed service operation. Displays exactly as the underlying
/// provider error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// What a handler can fail with. Every variant renders as an [`Envelope`]
/// whose `detail` is the error's `Display`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required query or path parameter is missing or empty.
    #[error("{0}")]
    Validation(String),

    /// Any service failure, whatever its cause.
    #[error(transparent)]
    Downstream(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope::new(self.status(), self.to_string(), None).into_response()
    }
}
