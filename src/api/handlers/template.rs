use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::{ApplyTemplateRequest, CreateTemplateRequest};
use crate::api::extractors::caller::AdminCaller;
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let definitions = payload.entries
        .into_iter()
        .map(|entry| (entry.day_offset, entry.start_time, entry.duration_minutes))
        .collect();

    let template = state.slots.create_template(payload.name, payload.description, definitions).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.slots.list_templates().await?))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.slots.get_template(&template_id).await?))
}

pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.slots.delete_template(&template_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn apply_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(template_id): Path<String>,
    Json(payload): Json<ApplyTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let applied = state.slots.apply_template(&template_id, payload.week_start).await?;
    Ok(Json(applied))
}
