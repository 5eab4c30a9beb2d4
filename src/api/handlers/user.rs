use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::CreateUserRequest;
use crate::api::extractors::caller::AdminCaller;
use crate::domain::models::user::User;
use crate::state::AppState;
use crate::error::{is_unique_violation, AppError};
use std::sync::Arc;
use tracing::info;

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::Validation("A name and a valid email are required".into()));
    }

    let user = User::new(payload.name, payload.email);
    let created = state.user_repo.create(&user).await.map_err(|e| match e {
        AppError::Database(ref db) if is_unique_violation(db) => AppError::InvalidState("Email already registered".into()),
        other => other,
    })?;

    info!("Registered user {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.user_repo.list().await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound(format!("User {} not found", user_id)))?;
    Ok(Json(user))
}
