use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::{AdminCancelRequest, AdminReserveSlotRequest, CreateReservationRequest, DateRangeQuery};
use crate::api::extractors::caller::{AdminCaller, Caller};
use crate::domain::services::reservation_service::ClientBookingRequest;
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Booking request from {} for {} {}-{}", user.id, payload.date, payload.start_time, payload.end_time);

    let reservation = state.reservations.create_reservation(ClientBookingRequest {
        user_id: user.id,
        block_id: payload.block_id,
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        pricing_item_id: payload.pricing_item_id,
        note: payload.note,
    }).await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn list_my_reservations(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
) -> Result<impl IntoResponse, AppError> {
    let reservations = state.reservations.list_for_user(&user.id).await?;
    Ok(Json(reservations))
}

pub async fn get_my_reservation(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    Path(reservation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state.reservations.get_reservation(&reservation_id).await?;
    if reservation.user_id != user.id {
        return Err(AppError::NotOwner);
    }
    Ok(Json(reservation))
}

pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    Path(reservation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state.reservations.cancel_reservation(&user.id, &reservation_id).await?;
    Ok(Json(reservation))
}

pub async fn admin_list_reservations(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reservations = state.reservations.list_by_range(range.from, range.to).await?;
    Ok(Json(reservations))
}

pub async fn admin_cancel_reservation(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(reservation_id): Path<String>,
    Json(payload): Json<AdminCancelRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state.reservations.admin_cancel_reservation(&reservation_id, payload.refund_credits).await?;
    Ok(Json(reservation))
}

pub async fn admin_reserve_slot(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(slot_id): Path<String>,
    Json(payload): Json<AdminReserveSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state.reservations
        .admin_create_reservation(&slot_id, &payload.user_id, payload.deduct_credits)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}
