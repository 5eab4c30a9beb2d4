use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::{CreateBlockRequest, UpdateBlockRequest};
use crate::api::extractors::caller::AdminCaller;
use crate::domain::models::block::{AvailabilityBlock, NewBlockParams};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_block(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Json(payload): Json<CreateBlockRequest>,
) -> Result<impl IntoResponse, AppError> {
    let block = AvailabilityBlock::new(NewBlockParams {
        name: payload.name,
        days_of_week: payload.days_of_week,
        specific_date: payload.specific_date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        slot_duration_minutes: payload.slot_duration_minutes,
        break_after_slots: payload.break_after_slots,
        break_minutes: payload.break_minutes,
        is_blocked: payload.is_blocked,
    });
    block.validate()?;

    let created = state.block_repo.create(&block).await?;
    info!("Created block {} ({}-{}, {} min)", created.id, created.start_time, created.end_time, created.slot_duration_minutes);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_blocks(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.block_repo.list().await?))
}

pub async fn get_block(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(block_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let block = state.block_repo.find_by_id(&block_id).await?
        .ok_or(AppError::NotFound(format!("Block {} not found", block_id)))?;
    Ok(Json(block))
}

pub async fn update_block(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(block_id): Path<String>,
    Json(payload): Json<UpdateBlockRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut block = state.block_repo.find_by_id(&block_id).await?
        .ok_or(AppError::NotFound(format!("Block {} not found", block_id)))?;

    if let Some(name) = payload.name { block.name = Some(name); }
    if let Some(days) = payload.days_of_week { block.days_of_week = days; }
    if let Some(date) = payload.specific_date {
        block.specific_date = Some(date);
        block.is_recurring = false;
    }
    if let Some(start) = payload.start_time { block.start_time = start; }
    if let Some(end) = payload.end_time { block.end_time = end; }
    if let Some(duration) = payload.slot_duration_minutes { block.slot_duration_minutes = duration; }
    if let Some(after) = payload.break_after_slots { block.break_after_slots = Some(after); }
    if let Some(minutes) = payload.break_minutes { block.break_minutes = Some(minutes); }
    if let Some(blocked) = payload.is_blocked { block.is_blocked = blocked; }
    if let Some(active) = payload.is_active { block.is_active = active; }

    block.validate()?;

    let updated = state.block_repo.update(&block).await?;
    info!("Updated block {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_block(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(block_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.block_repo.delete(&block_id).await?;
    info!("Deleted block {}", block_id);
    Ok(StatusCode::NO_CONTENT)
}
