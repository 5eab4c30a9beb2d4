mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{next_monday, t, TestApp};
use trainer_booking::domain::models::slot::SlotStatus;
use trainer_booking::domain::services::slot_service::SlotChanges;
use trainer_booking::error::AppError;
use serde_json::json;

async fn week_template(app: &TestApp) -> String {
    let (status, body) = app.admin("POST", "/api/v1/admin/templates", Some(json!({
        "name": "Standard week",
        "entries": [
            { "day_offset": 0, "start_time": "09:00:00", "duration_minutes": 60 },
            { "day_offset": 0, "start_time": "10:00:00", "duration_minutes": 60 },
            { "day_offset": 2, "start_time": "18:00:00", "duration_minutes": 90 }
        ]
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entries"].as_array().unwrap().len(), 3);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_template_apply_is_idempotent() {
    let app = TestApp::new().await;
    let week = next_monday();
    let template_id = week_template(&app).await;

    let uri = format!("/api/v1/admin/templates/{}/apply", template_id);
    let (status, first) = app.admin("POST", &uri, Some(json!({ "week_start": week }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["created_count"], 3);
    assert!(first["slots"].as_array().unwrap().iter().all(|s| s["status"] == "LOCKED"));

    let (status, second) = app.admin("POST", &uri, Some(json!({ "week_start": week }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created_count"], 0);

    let slots = app.state.slots.list_slots(week, week + Duration::days(6)).await.unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[2].date, week + Duration::days(2));
    assert_eq!(slots[2].end_time, t(19, 30));
}

#[tokio::test]
async fn test_template_skips_ranges_taken_by_manual_slots() {
    let app = TestApp::new().await;
    let week = next_monday();
    let template_id = week_template(&app).await;

    app.state.slots.create_slot(week, t(9, 30), t(10, 30), false, None).await.unwrap();

    let applied = app.state.slots.apply_template(&template_id, week).await.unwrap();
    assert_eq!(applied.created_count, 1);
}

#[tokio::test]
async fn test_unlock_week_releases_locked_slots() {
    let app = TestApp::new().await;
    let week = next_monday();
    let template_id = week_template(&app).await;
    app.state.slots.apply_template(&template_id, week).await.unwrap();
    app.state.slots.create_slot(week + Duration::days(7), t(9, 0), t(10, 0), true, None).await.unwrap();

    let (status, body) = app.admin("POST", &format!("/api/v1/admin/weeks/{}/unlock", week), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unlocked_count"], 3);

    let this_week = app.state.slots.list_slots(week, week + Duration::days(6)).await.unwrap();
    assert!(this_week.iter().all(|s| s.status == SlotStatus::Unlocked));
    let next_week = app.state.slots.list_slots(week + Duration::days(7), week + Duration::days(13)).await.unwrap();
    assert_eq!(next_week[0].status, SlotStatus::Locked);
}

#[tokio::test]
async fn test_admin_reserve_and_delete_guard() {
    let app = TestApp::new().await;
    let date = next_monday();
    let user = app.create_user_with_credits("pia", 2).await;

    let locked = app.state.slots.create_slot(date, t(9, 0), t(10, 0), true, None).await.unwrap();
    let result = app.state.reservations.admin_create_reservation(&locked.id, &user.id, true).await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));

    app.state.slots.unlock_slot(&locked.id).await.unwrap();
    let (status, body) = app.admin("POST", &format!("/api/v1/admin/slots/{}/reserve", locked.id), Some(json!({
        "user_id": user.id,
        "deduct_credits": true
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slot_id"], locked.id.as_str());
    assert_eq!(app.balance(&user.id).await, 1);

    let reserved = app.state.slot_repo.find_by_id(&locked.id).await.unwrap().unwrap();
    assert_eq!(reserved.status, SlotStatus::Reserved);
    assert_eq!(reserved.assigned_user_id.as_deref(), Some(user.id.as_str()));

    let (status, body) = app.admin("DELETE", &format!("/api/v1/admin/slots/{}", locked.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");

    let lock = app.state.slots.lock_slot(&locked.id).await;
    assert!(matches!(lock, Err(AppError::InvalidState(_))));

    // Cancelling releases the slot; it can be deleted or re-offered afterwards.
    let reservation_id = body_id(&app, &user.id).await;
    app.state.reservations.admin_cancel_reservation(&reservation_id, true).await.unwrap();
    assert_eq!(app.balance(&user.id).await, 2);

    let cancelled = app.state.slot_repo.find_by_id(&locked.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, SlotStatus::Cancelled);

    let relocked = app.state.slots.unlock_slot(&locked.id).await.unwrap();
    assert_eq!(relocked.status, SlotStatus::Unlocked);
    assert!(relocked.assigned_user_id.is_none());

    let (status, _) = app.admin("DELETE", &format!("/api/v1/admin/slots/{}", locked.id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cancelled_slot_cannot_return_over_a_reused_range() {
    let app = TestApp::new().await;
    let date = next_monday();
    let user = app.create_user("quinn").await;

    let original = app.state.slots.create_slot(date, t(9, 0), t(10, 0), false, None).await.unwrap();
    let reservation = app.state.reservations.admin_create_reservation(&original.id, &user.id, false).await.unwrap();
    app.state.reservations.admin_cancel_reservation(&reservation.id, false).await.unwrap();

    let replacement = app.state.slots.create_slot(date, t(9, 0), t(10, 0), true, None).await.unwrap();

    let unlock = app.state.slots.unlock_slot(&original.id).await;
    assert!(matches!(unlock, Err(AppError::InvalidState(_))));
    let lock = app.state.slots.lock_slot(&original.id).await;
    assert!(matches!(lock, Err(AppError::InvalidState(_))));
    let (status, body) = app.admin("POST", &format!("/api/v1/admin/slots/{}/block", original.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");

    let live = app.state.slot_repo.find_overlap(date, t(9, 0), t(10, 0), None).await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, replacement.id);

    // Once the range is free again the cancelled slot can come back.
    app.state.slots.delete_slot(&replacement.id).await.unwrap();
    let restored = app.state.slots.unlock_slot(&original.id).await.unwrap();
    assert_eq!(restored.status, SlotStatus::Unlocked);
}

#[tokio::test]
async fn test_admin_reserve_charges_default_price() {
    let app = TestApp::with_config(|config| config.default_reservation_credits = 2).await;
    let date = next_monday();
    let user = app.create_user_with_credits("rosa", 3).await;

    let slot = app.state.slots.create_slot(date, t(9, 0), t(10, 0), false, None).await.unwrap();
    let reservation = app.state.reservations.admin_create_reservation(&slot.id, &user.id, true).await.unwrap();
    assert_eq!(reservation.credits_used, 2);
    assert_eq!(app.balance(&user.id).await, 1);

    let second = app.state.slots.create_slot(date, t(10, 0), t(11, 0), false, None).await.unwrap();
    let result = app.state.reservations.admin_create_reservation(&second.id, &user.id, true).await;
    assert!(matches!(result, Err(AppError::InsufficientCredits)));

    let untouched = app.state.slot_repo.find_by_id(&second.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, SlotStatus::Unlocked);
}

async fn body_id(app: &TestApp, user_id: &str) -> String {
    app.state.reservations.list_for_user(user_id).await.unwrap()[0].id.clone()
}

#[tokio::test]
async fn test_delete_allowed_in_every_unreserved_state() {
    let app = TestApp::new().await;
    let date = next_monday();

    let locked = app.state.slots.create_slot(date, t(8, 0), t(9, 0), true, None).await.unwrap();
    let unlocked = app.state.slots.create_slot(date, t(9, 0), t(10, 0), false, None).await.unwrap();
    let blocked = app.state.slots.create_slot(date, t(10, 0), t(11, 0), true, None).await.unwrap();
    app.state.slots.block_slot(&blocked.id).await.unwrap();

    let user = app.create_user("rosa").await;
    let cancelled = app.state.slots.create_slot(date, t(11, 0), t(12, 0), false, None).await.unwrap();
    let reservation = app.state.reservations.admin_create_reservation(&cancelled.id, &user.id, false).await.unwrap();
    app.state.reservations.admin_cancel_reservation(&reservation.id, false).await.unwrap();

    for slot in [&locked, &unlocked, &blocked, &cancelled] {
        app.state.slots.delete_slot(&slot.id).await.unwrap();
    }
    assert!(app.state.slots.list_slots(date, date).await.unwrap().is_empty());

    let missing = app.state.slots.delete_slot(&locked.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_slot_overlap_and_move_rules() {
    let app = TestApp::new().await;
    let date = next_monday();
    let user = app.create_user_with_credits("quinn", 1).await;

    let first = app.state.slots.create_slot(date, t(9, 0), t(10, 0), false, None).await.unwrap();
    let second = app.state.slots.create_slot(date, t(10, 0), t(11, 0), false, None).await.unwrap();

    let clash = app.state.slots.create_slot(date, t(9, 30), t(10, 30), false, None).await;
    assert!(matches!(clash, Err(AppError::InvalidState(_))));

    let onto_neighbour = app.state.slots.update_slot(&second.id, SlotChanges {
        date: None, start_time: Some(t(9, 30)), end_time: Some(t(10, 30)), note: None,
    }).await;
    assert!(matches!(onto_neighbour, Err(AppError::InvalidState(_))));

    let (status, body) = app.admin("PUT", &format!("/api/v1/admin/slots/{}", second.id), Some(json!({
        "start_time": "11:00:00",
        "end_time": "12:30:00",
        "note": "moved"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration_minutes"], 90);
    assert_eq!(body["note"], "moved");

    app.state.reservations.admin_create_reservation(&first.id, &user.id, false).await.unwrap();
    assert_eq!(app.balance(&user.id).await, 1);

    let move_reserved = app.state.slots.update_slot(&first.id, SlotChanges {
        date: Some(date + Duration::days(1)), start_time: None, end_time: None, note: None,
    }).await;
    assert!(matches!(move_reserved, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn test_template_validation_and_deletion() {
    let app = TestApp::new().await;

    let (status, _) = app.admin("POST", "/api/v1/admin/templates", Some(json!({
        "name": "Broken",
        "entries": [{ "day_offset": 7, "start_time": "09:00:00", "duration_minutes": 60 }]
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let template_id = week_template(&app).await;
    let (status, body) = app.admin("GET", &format!("/api/v1/admin/templates/{}", template_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"][2]["day_offset"], 2);

    let (status, _) = app.admin("DELETE", &format!("/api/v1/admin/templates/{}", template_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.admin("GET", &format!("/api/v1/admin/templates/{}", template_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
