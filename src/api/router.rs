use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, availability, reservation, slot, template, block, credit, user, pricing};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Client
        .route("/api/v1/availability", get(availability::get_availability))
        .route("/api/v1/pricing-items", get(pricing::list_pricing_items))
        .route("/api/v1/reservations", post(reservation::create_reservation).get(reservation::list_my_reservations))
        .route("/api/v1/reservations/{reservation_id}", get(reservation::get_my_reservation))
        .route("/api/v1/reservations/{reservation_id}/cancel", post(reservation::cancel_reservation))
        .route("/api/v1/credits", get(credit::get_my_credits))
        .route("/api/v1/credits/plans", post(credit::purchase_plan))

        // Payment gateway
        .route("/api/v1/payments/webhook", post(credit::payment_webhook))

        // Admin - Blocks
        .route("/api/v1/admin/blocks", get(block::list_blocks).post(block::create_block))
        .route("/api/v1/admin/blocks/{block_id}", get(block::get_block).put(block::update_block).delete(block::delete_block))

        // Admin - Slots
        .route("/api/v1/admin/slots", get(slot::list_slots).post(slot::create_slot))
        .route("/api/v1/admin/slots/{slot_id}", put(slot::update_slot).delete(slot::delete_slot))
        .route("/api/v1/admin/slots/{slot_id}/lock", post(slot::lock_slot))
        .route("/api/v1/admin/slots/{slot_id}/unlock", post(slot::unlock_slot))
        .route("/api/v1/admin/slots/{slot_id}/block", post(slot::block_slot))
        .route("/api/v1/admin/slots/{slot_id}/reserve", post(reservation::admin_reserve_slot))
        .route("/api/v1/admin/weeks/{week_start}/unlock", post(slot::unlock_week))

        // Admin - Templates
        .route("/api/v1/admin/templates", get(template::list_templates).post(template::create_template))
        .route("/api/v1/admin/templates/{template_id}", get(template::get_template).delete(template::delete_template))
        .route("/api/v1/admin/templates/{template_id}/apply", post(template::apply_template))

        // Admin - Reservations
        .route("/api/v1/admin/reservations", get(reservation::admin_list_reservations))
        .route("/api/v1/admin/reservations/{reservation_id}/cancel", post(reservation::admin_cancel_reservation))

        // Admin - Users & Credits
        .route("/api/v1/admin/users", get(user::list_users).post(user::create_user))
        .route("/api/v1/admin/users/{user_id}", get(user::get_user))
        .route("/api/v1/admin/users/{user_id}/credits", get(credit::admin_get_credits).post(credit::admin_adjust_credits))
        .route("/api/v1/admin/users/{user_id}/ledger", get(credit::admin_verify_ledger))

        // Admin - Pricing
        .route("/api/v1/admin/pricing-items", post(pricing::create_pricing_item))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
