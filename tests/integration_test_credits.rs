mod common;

use axum::http::StatusCode;
use common::TestApp;
use trainer_booking::domain::models::credit::CreditTransactionType;
use trainer_booking::error::AppError;
use serde_json::json;

async fn credit_package(app: &TestApp, credits: i64) -> String {
    let (status, body) = app.admin("POST", "/api/v1/admin/pricing-items", Some(json!({
        "name": format!("{} pack", credits),
        "kind": "CREDIT_PACKAGE",
        "credits": credits,
        "price_cents": credits * 2500
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_payment_webhook_is_idempotent() {
    let app = TestApp::new().await;
    let user = app.create_user("anna").await;
    let package_id = credit_package(&app, 10).await;

    let payload = json!({
        "user_id": user.id,
        "package_id": package_id,
        "external_payment_id": "pi_123"
    });

    let (status, body) = app.request("POST", "/api/v1/payments/webhook", None, false, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 10);

    let (status, body) = app.request("POST", "/api/v1/payments/webhook", None, false, Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 10);

    let history = app.state.credits.history(&user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].transaction_type, CreditTransactionType::Purchase);
    assert_eq!(history[0].reference_id.as_deref(), Some(package_id.as_str()));
}

#[tokio::test]
async fn test_payment_id_cannot_be_reused_for_another_user() {
    let app = TestApp::new().await;
    let payer = app.create_user("carla").await;
    let other = app.create_user("dirk").await;
    let package_id = credit_package(&app, 5).await;

    let balance = app.state.credits.add_credits_from_payment(&payer.id, &package_id, "pi_shared").await.unwrap();
    assert_eq!(balance, 5);

    let result = app.state.credits.add_credits_from_payment(&other.id, &package_id, "pi_shared").await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));

    let (status, body) = app.request("POST", "/api/v1/payments/webhook", None, false, Some(json!({
        "user_id": other.id,
        "package_id": package_id,
        "external_payment_id": "pi_shared"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");

    assert_eq!(app.balance(&payer.id).await, 5);
    assert_eq!(app.balance(&other.id).await, 0);
    assert!(app.state.credits.history(&other.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_requires_credit_package() {
    let app = TestApp::new().await;
    let user = app.create_user("ben").await;
    let session = app.create_session_price(1).await;

    let result = app.state.credits.add_credits_from_payment(&user.id, &session.id, "pi_456").await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let result = app.state.credits.add_credits_from_payment(&user.id, "missing", "pi_789").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(app.balance(&user.id).await, 0);
}

#[tokio::test]
async fn test_admin_adjustments_and_audit() {
    let app = TestApp::new().await;
    let user = app.create_user("carla").await;

    let uri = format!("/api/v1/admin/users/{}/credits", user.id);
    let (status, body) = app.admin("POST", &uri, Some(json!({ "amount": 5, "note": "welcome" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 5);

    let (status, body) = app.admin("POST", &uri, Some(json!({ "amount": -7 }))).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "INSUFFICIENT_CREDITS");

    let (status, body) = app.admin("POST", &uri, Some(json!({ "amount": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app.admin("POST", &uri, Some(json!({ "amount": -2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 3);

    let (status, body) = app.admin("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 3);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 2);

    let (status, body) = app.admin("GET", &format!("/api/v1/admin/users/{}/ledger", user.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["consistent"], true);
    assert_eq!(body["transaction_sum"], 3);
}

#[tokio::test]
async fn test_plan_purchase_spends_credits() {
    let app = TestApp::new().await;
    let user = app.create_user_with_credits("dora", 4).await;

    let (status, body) = app.client("POST", "/api/v1/credits/plans", &user.id, Some(json!({
        "plan_id": "plan-8-weeks",
        "credits": 3
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 1);

    let (status, _) = app.client("POST", "/api/v1/credits/plans", &user.id, Some(json!({
        "plan_id": "plan-8-weeks",
        "credits": 3
    }))).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

    let (status, body) = app.client("GET", "/api/v1/credits", &user.id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 1);
    let plan = body["transactions"].as_array().unwrap()
        .iter()
        .find(|tx| tx["transaction_type"] == "PLAN_PURCHASE")
        .unwrap();
    assert_eq!(plan["amount"], -3);
    assert_eq!(plan["reference_id"], "plan-8-weeks");
}

#[tokio::test]
async fn test_unknown_caller_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.client("GET", "/api/v1/credits", "nobody", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let result = app.state.credits.balance("nobody").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_user_registry() {
    let app = TestApp::new().await;

    let (status, created) = app.admin("POST", "/api/v1/admin/users", Some(json!({
        "name": "Emil", "email": "emil@example.com"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.admin("POST", "/api/v1/admin/users", Some(json!({
        "name": "Emil again", "email": "emil@example.com"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");

    let (status, body) = app.admin("GET", &format!("/api/v1/admin/users/{}", created["id"].as_str().unwrap()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "emil@example.com");

    let (status, body) = app.request("GET", "/api/v1/pricing-items", None, false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
