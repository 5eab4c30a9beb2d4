use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::api::dtos::{requests::AvailabilityQuery, responses::AvailabilityResponse};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let slots = state.availability.compute_availability(query.date).await?;
    Ok(Json(AvailabilityResponse { date: query.date, slots }))
}
