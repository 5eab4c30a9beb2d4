use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::CreatePricingItemRequest;
use crate::api::extractors::caller::AdminCaller;
use crate::domain::models::pricing::PricingItem;
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_pricing_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Json(payload): Json<CreatePricingItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Pricing item name is required".into()));
    }
    if payload.credits < 0 || payload.price_cents < 0 {
        return Err(AppError::Validation("Credits and price must not be negative".into()));
    }

    let item = PricingItem::new(payload.name, payload.kind, payload.credits, payload.price_cents);
    let created = state.pricing_repo.create(&item).await?;
    info!("Created pricing item {} ({:?}, {} credits)", created.id, created.kind, created.credits);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Public price list.
pub async fn list_pricing_items(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.pricing_repo.list().await?))
}
