use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::{
    requests::{AdjustCreditsRequest, PaymentWebhookRequest, PurchasePlanRequest},
    responses::{BalanceResponse, CreditAccountResponse},
};
use crate::api::extractors::caller::{AdminCaller, Caller};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

async fn account(state: &AppState, user_id: &str) -> Result<CreditAccountResponse, AppError> {
    let balance = state.credits.balance(user_id).await?;
    let transactions = state.credits.history(user_id).await?;
    Ok(CreditAccountResponse { user_id: balance.user_id, balance: balance.balance, transactions })
}

pub async fn get_my_credits(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(account(&state, &user.id).await?))
}

pub async fn purchase_plan(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    Json(payload): Json<PurchasePlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let balance = state.credits.purchase_plan(&user.id, &payload.plan_id, payload.credits).await?;
    Ok(Json(BalanceResponse { user_id: user.id, balance }))
}

/// Called by the payment gateway once a credit package payment has settled.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PaymentWebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let balance = state.credits
        .add_credits_from_payment(&payload.user_id, &payload.package_id, &payload.external_payment_id)
        .await?;
    Ok(Json(BalanceResponse { user_id: payload.user_id, balance }))
}

pub async fn admin_get_credits(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(account(&state, &user_id).await?))
}

pub async fn admin_adjust_credits(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(user_id): Path<String>,
    Json(payload): Json<AdjustCreditsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let balance = state.credits.adjust_credits(&user_id, payload.amount, payload.note).await?;
    Ok(Json(BalanceResponse { user_id, balance }))
}

pub async fn admin_verify_ledger(
    State(state): State<Arc<AppState>>,
    _admin: AdminCaller,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.credits.verify_ledger(&user_id).await?))
}
