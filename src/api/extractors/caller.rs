use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use crate::domain::models::user::User;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::Span;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Registered client identified by the gateway-supplied `X-User-Id` header.
pub struct Caller(pub User);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let user_id = parts.headers.get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let user = state.user_repo.find_by_id(user_id).await?
            .ok_or(AppError::Unauthorized)?;

        Span::current().record("user_id", user.id.as_str());
        Ok(Caller(user))
    }
}

/// Trainer-side caller. The gateway marks admins with `X-User-Role: ADMIN`.
pub struct AdminCaller;

impl FromRequestParts<Arc<AppState>> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let role = parts.headers.get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        if role != "ADMIN" {
            return Err(AppError::Forbidden("Admin role required".into()));
        }

        if let Some(admin_id) = parts.headers.get(USER_ID_HEADER).and_then(|value| value.to_str().ok()) {
            Span::current().record("user_id", admin_id);
        }
        Ok(AdminCaller)
    }
}
