use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Selected time slot is no longer available")]
    SlotUnavailable,
    #[error("Insufficient credits")]
    InsufficientCredits,
    #[error("Reservation belongs to another user")]
    NotOwner,
    #[error("Reservation is already cancelled")]
    AlreadyCancelled,
    #[error("Cancellation window has passed")]
    CancellationWindowPassed,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Stable machine-readable code sent alongside the human message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Internal | AppError::InternalWithMsg(_) => "INTERNAL",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::SlotUnavailable => "SLOT_UNAVAILABLE",
            AppError::InsufficientCredits => "INSUFFICIENT_CREDITS",
            AppError::NotOwner => "NOT_OWNER",
            AppError::AlreadyCancelled => "ALREADY_CANCELLED",
            AppError::CancellationWindowPassed => "CANCELLATION_WINDOW_PASSED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
        }
    }
}

/// 2067 = SQLite unique constraint, 23505 = PostgreSQL unique violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "2067" || code == "23505")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)", "code": "CONFLICT" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidState(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::SlotUnavailable => (StatusCode::CONFLICT, self.to_string()),
            AppError::InsufficientCredits => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            AppError::NotOwner => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::AlreadyCancelled => (StatusCode::CONFLICT, self.to_string()),
            AppError::CancellationWindowPassed => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
