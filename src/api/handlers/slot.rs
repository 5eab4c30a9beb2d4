use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDate;
use crate::api::dtos::{
    requests::{CreateSlotRequest, DateRangeQuery, UpdateSlotRequest},
    responses::UnlockWeekResponse,
};
use crate::api::extractors::caller::AdminCaller;
use crate::domain::services::slot_service::SlotChanges;
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let slots = state.slots.list_slots(range.from, range.to).await?;
    Ok(Json(slots))
}

pub async fn create_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Json(payload): Json<CreateSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.slots
        .create_slot(payload.date, payload.start_time, payload.end_time, payload.locked, payload.note)
        .await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

pub async fn update_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(slot_id): Path<String>,
    Json(payload): Json<UpdateSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.slots.update_slot(&slot_id, SlotChanges {
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        note: payload.note,
    }).await?;
    Ok(Json(slot))
}

pub async fn delete_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(slot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.slots.delete_slot(&slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn lock_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(slot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.slots.lock_slot(&slot_id).await?))
}

pub async fn unlock_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(slot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.slots.unlock_slot(&slot_id).await?))
}

pub async fn block_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(slot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.slots.block_slot(&slot_id).await?))
}

pub async fn unlock_week(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(week_start): Path<NaiveDate>,
) -> Result<impl IntoResponse, AppError> {
    let unlocked_count = state.slots.unlock_week(week_start).await?;
    Ok(Json(UnlockWeekResponse { week_start, unlocked_count }))
}
