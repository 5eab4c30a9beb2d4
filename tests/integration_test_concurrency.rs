mod common;

use chrono::{Duration, NaiveDate};
use common::{next_monday, t, TestApp};
use trainer_booking::domain::models::pricing::{PricingItem, PricingKind};
use trainer_booking::domain::services::reservation_service::ClientBookingRequest;
use trainer_booking::error::AppError;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_for_same_range_admit_exactly_one() {
    let app = TestApp::new().await;
    let date = next_monday();
    let block = app.create_block(date, t(9, 0), t(12, 0), 60).await;

    let mut users = Vec::new();
    for i in 0..8 {
        users.push(app.create_user_with_credits(&format!("racer{}", i), 1).await);
    }

    let mut set = JoinSet::new();
    for user in &users {
        let reservations = app.state.reservations.clone();
        let request = ClientBookingRequest {
            user_id: user.id.clone(),
            block_id: block.id.clone(),
            date,
            start_time: t(9, 0),
            end_time: t(10, 0),
            pricing_item_id: None,
            note: None,
        };
        set.spawn(async move { reservations.create_reservation(request).await });
    }

    let mut won = 0;
    let mut lost = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(_) => won += 1,
            Err(AppError::SlotUnavailable) => lost += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(won, 1);
    assert_eq!(lost, users.len() - 1);

    let confirmed = app.state.reservation_repo.list_confirmed_by_date(date).await.unwrap();
    assert_eq!(confirmed.len(), 1);

    let total: i64 = {
        let mut sum = 0;
        for user in &users {
            sum += app.balance(&user.id).await;
        }
        sum
    };
    assert_eq!(total, users.len() as i64 - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_debits_never_overdraw() {
    let app = TestApp::new().await;
    let user = app.create_user_with_credits("spender", 3).await;

    let mut set = JoinSet::new();
    for i in 0..10 {
        let credits = app.state.credits.clone();
        let user_id = user.id.clone();
        set.spawn(async move { credits.purchase_plan(&user_id, &format!("plan-{}", i), 1).await });
    }

    let mut succeeded = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::InsufficientCredits) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, 3);
    let audit = app.state.credits.verify_ledger(&user.id).await.unwrap();
    assert_eq!(audit.balance, 0);
    assert!(audit.consistent);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancellations_refund_once() {
    let app = TestApp::new().await;
    let date = next_monday();
    let block = app.create_block(date, t(9, 0), t(12, 0), 60).await;
    let user = app.create_user_with_credits("canceller", 1).await;
    let reservation = app.book(&user.id, &block.id, date, t(9, 0), t(10, 0)).await.unwrap();

    let mut set = JoinSet::new();
    for _ in 0..4 {
        let reservations = app.state.reservations.clone();
        let reservation_id = reservation.id.clone();
        set.spawn(async move { reservations.admin_cancel_reservation(&reservation_id, true).await });
    }

    let mut cancelled = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(_) => cancelled += 1,
            Err(AppError::AlreadyCancelled) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(cancelled, 1);
    assert_eq!(app.balance(&user.id).await, 1);
    assert!(app.state.credits.verify_ledger(&user.id).await.unwrap().consistent);
}

fn nine_to_ten(user_id: &str, block_id: &str, date: NaiveDate) -> ClientBookingRequest {
    ClientBookingRequest {
        user_id: user_id.to_string(),
        block_id: block_id.to_string(),
        date,
        start_time: t(9, 0),
        end_time: t(10, 0),
        pricing_item_id: None,
        note: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bookings_on_distinct_blocks_all_succeed() {
    let app = TestApp::new().await;
    let date = next_monday();

    let mut set = JoinSet::new();
    for i in 0..16 {
        let user = app.create_user_with_credits(&format!("athlete{}", i), 1).await;
        let block = app.create_block(date, t(9, 0), t(12, 0), 60).await;
        let reservations = app.state.reservations.clone();
        set.spawn(async move { reservations.create_reservation(nine_to_ten(&user.id, &block.id, date)).await });
    }

    while let Some(joined) = set.join_next().await {
        if let Err(e) = joined.unwrap() {
            panic!("independent booking failed: {:?}", e);
        }
    }

    let confirmed = app.state.reservation_repo.list_confirmed_by_date(date).await.unwrap();
    assert_eq!(confirmed.len(), 16);
    assert_eq!(app.state.reservations.tracked_lock_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_user_cannot_race_into_overlapping_blocks() {
    let app = TestApp::new().await;
    let first_monday = next_monday();
    let rounds = 10;
    let user = app.create_user_with_credits("greedy", 2 * rounds).await;
    let left = app.create_block(first_monday, t(9, 0), t(12, 0), 60).await;
    let right = app.create_block(first_monday, t(9, 0), t(12, 0), 60).await;

    for week in 0..rounds {
        let date = first_monday + Duration::weeks(week);

        let mut set = JoinSet::new();
        for block_id in [left.id.clone(), right.id.clone()] {
            let reservations = app.state.reservations.clone();
            let request = nine_to_ten(&user.id, &block_id, date);
            set.spawn(async move { reservations.create_reservation(request).await });
        }

        let mut won = 0;
        while let Some(joined) = set.join_next().await {
            match joined.unwrap() {
                Ok(_) => won += 1,
                Err(AppError::InvalidState(_)) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(won, 1, "week {} admitted overlapping bookings", week);

        let held = app.state.reservation_repo.list_confirmed_by_date(date).await.unwrap();
        assert_eq!(held.len(), 1);
    }

    assert_eq!(app.balance(&user.id).await, rounds);
    assert!(app.state.credits.verify_ledger(&user.id).await.unwrap().consistent);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_payment_id_credits_exactly_one_user() {
    let app = TestApp::new().await;
    let package = PricingItem::new("5 pack".into(), PricingKind::CreditPackage, 5, 12500);
    let package = app.state.pricing_repo.create(&package).await.unwrap();

    let mut users = Vec::new();
    for i in 0..6 {
        users.push(app.create_user(&format!("payer{}", i)).await);
    }

    let mut set = JoinSet::new();
    for user in &users {
        let credits = app.state.credits.clone();
        let user_id = user.id.clone();
        let package_id = package.id.clone();
        set.spawn(async move { credits.add_credits_from_payment(&user_id, &package_id, "pi_race").await });
    }

    let mut credited = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(balance) => {
                assert_eq!(balance, 5);
                credited += 1;
            }
            Err(AppError::InvalidState(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(credited, 1);

    let mut total = 0;
    for user in &users {
        total += app.balance(&user.id).await;
    }
    assert_eq!(total, 5);
}
