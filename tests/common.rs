use trainer_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{
        block::{AvailabilityBlock, NewBlockParams, WeekdaySet},
        pricing::{PricingItem, PricingKind},
        reservation::Reservation,
        user::User,
    },
    domain::services::reservation_service::ClientBookingRequest,
    infra::repositories::{
        sqlite_user_repo::SqliteUserRepo,
        sqlite_block_repo::SqliteBlockRepo,
        sqlite_slot_repo::SqliteSlotRepo,
        sqlite_template_repo::SqliteTemplateRepo,
        sqlite_reservation_repo::SqliteReservationRepo,
        sqlite_credit_repo::SqliteCreditRepo,
        sqlite_pricing_repo::SqlitePricingRepo,
    },
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(StdDuration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut config = Config::with_database_url(db_url.clone());
        customize(&mut config);

        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteBlockRepo::new(pool.clone())),
            Arc::new(SqliteSlotRepo::new(pool.clone())),
            Arc::new(SqliteTemplateRepo::new(pool.clone())),
            Arc::new(SqliteReservationRepo::new(pool.clone())),
            Arc::new(SqliteCreditRepo::new(pool.clone())),
            Arc::new(SqlitePricingRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn create_user(&self, name: &str) -> User {
        let user = User::new(name.to_string(), format!("{}-{}@example.com", name, Uuid::new_v4()));
        self.state.user_repo.create(&user).await.unwrap()
    }

    /// User with an opening balance recorded as an admin adjustment.
    pub async fn create_user_with_credits(&self, name: &str, credits: i64) -> User {
        let user = self.create_user(name).await;
        if credits != 0 {
            self.state.credits.adjust_credits(&user.id, credits, Some("opening balance".into())).await.unwrap();
        }
        user
    }

    pub async fn balance(&self, user_id: &str) -> i64 {
        self.state.credits.balance(user_id).await.unwrap().balance
    }

    /// Weekly block on the weekday of `date`.
    pub async fn create_block(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime, duration: i32) -> AvailabilityBlock {
        let block = AvailabilityBlock::new(NewBlockParams {
            name: Some("Training".into()),
            days_of_week: WeekdaySet::from_iso_days(&[date.weekday().number_from_monday()]).unwrap(),
            specific_date: None,
            start_time: start,
            end_time: end,
            slot_duration_minutes: duration,
            break_after_slots: None,
            break_minutes: None,
            is_blocked: false,
        });
        self.state.block_repo.create(&block).await.unwrap()
    }

    pub async fn create_session_price(&self, credits: i64) -> PricingItem {
        let item = PricingItem::new(format!("{} credit session", credits), PricingKind::Session, credits, 0);
        self.state.pricing_repo.create(&item).await.unwrap()
    }

    pub async fn book(&self, user_id: &str, block_id: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Reservation, AppError> {
        self.state.reservations.create_reservation(ClientBookingRequest {
            user_id: user_id.to_string(),
            block_id: block_id.to_string(),
            date,
            start_time: start,
            end_time: end,
            pricing_item_id: None,
            note: None,
        }).await
    }

    /// Sends a request, optionally as a client (`X-User-Id`) and/or as admin.
    pub async fn request(&self, method: &str, uri: &str, user_id: Option<&str>, admin: bool, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("X-User-Id", user_id);
        }
        if admin {
            builder = builder.header("X-User-Role", "ADMIN");
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(method, uri, None, true, body).await
    }

    pub async fn client(&self, method: &str, uri: &str, user_id: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(method, uri, Some(user_id), false, body).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// A Monday at least a week out, so nothing on it is ever in the past.
#[allow(dead_code)]
pub fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday().number_from_monday() != 1 {
        date += Duration::days(1);
    }
    date
}
