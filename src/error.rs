use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("gateway configuration incomplete: {0}")]
    Configuration(String),

    #[error("gateway rejected credentials: {0}")]
    Auth(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("gateway declined payment request: {0}")]
    Submission(String),

    #[error("merchant reference {0} matches no known record")]
    AmbiguousReference(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PaymentError::Auth(_) => StatusCode::BAD_GATEWAY,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Submission(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PaymentError::AmbiguousReference(_) => StatusCode::NOT_FOUND,
            PaymentError::Storage(_) | PaymentError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Configuration(_) => "GATEWAY_CONFIG_INCOMPLETE",
            PaymentError::Auth(_) => "GATEWAY_AUTH_FAILED",
            PaymentError::NotFound(_) => "RECORD_NOT_FOUND",
            PaymentError::Submission(_) => "GATEWAY_REJECTED",
            PaymentError::AmbiguousReference(_) => "UNRESOLVED_REFERENCE",
            PaymentError::Storage(_) | PaymentError::Transport(_) => "INTERNAL_ERROR",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        // Infrastructure failures stay opaque to the caller; gateway errors are
        // surfaced verbatim so operators can diagnose declined requests.
        let message = match self {
            PaymentError::Storage(_) | PaymentError::Transport(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        ErrorEnvelope {
            error: ErrorPayload {
                code: self.code().to_string(),
                message,
                details: None,
            },
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "payment flow error");
        }
        (status, Json(self.envelope())).into_response()
    }
}
