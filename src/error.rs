use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PortalError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many archive requests, try again later")]
    RateLimited,

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Internal(String),
}

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::BadRequest(_) | PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::Unauthorized(_) | PortalError::Jwt(_) => StatusCode::UNAUTHORIZED,
            PortalError::Forbidden(_) => StatusCode::FORBIDDEN,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            PortalError::DatabaseError(_)
            | PortalError::Io(_)
            | PortalError::Json(_)
            | PortalError::Ssh(_)
            | PortalError::Join(_)
            | PortalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            PortalError::Unauthorized(_) => ApiErrorResponse::detail(self.to_string()),
            PortalError::Jwt(_) => {
                ApiErrorResponse::detail("Given token not valid for any token type".to_string())
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "request failed");
                ApiErrorResponse::error(format!("Error: {self}"))
            }
            _ => ApiErrorResponse::error(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON error body. Authentication failures use `detail`, everything else `error`.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiErrorResponse {
    pub fn error(message: String) -> Self {
        Self {
            error: Some(message),
            detail: None,
        }
    }

    pub fn detail(message: String) -> Self {
        Self {
            error: None,
            detail: Some(message),
        }
    }
}
