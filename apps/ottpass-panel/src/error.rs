use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A record exists but is in a state the operation does not accept,
    /// e.g. deciding an already-decided payment.
    #[error("{0}")]
    InvalidState(String),

    #[error("Daily quota exceeded")]
    QuotaExceeded,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::QuotaExceeded => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                // Don't leak internal error detail to the client.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}
