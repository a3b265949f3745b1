use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Internal(_)
            | AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client. Server-side failures are logged here
    /// and replaced by a generic message.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal Server Error".to_string()
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                "Internal Server Error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::Anyhow(e) => {
                tracing::error!("Anyhow error: {:?}", e);
                "Internal Server Error".to_string()
            }
            AppError::Validation(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Unauthenticated
            | AppError::InvalidCredentials
            | AppError::DuplicateUsername => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.public_message()
        }));

        (status, body).into_response()
    }
}
