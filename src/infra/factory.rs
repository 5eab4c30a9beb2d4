use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_user_repo::PostgresUserRepo, postgres_block_repo::PostgresBlockRepo,
    postgres_slot_repo::PostgresSlotRepo, postgres_template_repo::PostgresTemplateRepo,
    postgres_reservation_repo::PostgresReservationRepo, postgres_credit_repo::PostgresCreditRepo,
    postgres_pricing_repo::PostgresPricingRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_block_repo::SqliteBlockRepo,
    sqlite_slot_repo::SqliteSlotRepo, sqlite_template_repo::SqliteTemplateRepo,
    sqlite_reservation_repo::SqliteReservationRepo, sqlite_credit_repo::SqliteCreditRepo,
    sqlite_pricing_repo::SqlitePricingRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        AppState::new(
            config.clone(),
            Arc::new(PostgresUserRepo::new(pool.clone())),
            Arc::new(PostgresBlockRepo::new(pool.clone())),
            Arc::new(PostgresSlotRepo::new(pool.clone())),
            Arc::new(PostgresTemplateRepo::new(pool.clone())),
            Arc::new(PostgresReservationRepo::new(pool.clone())),
            Arc::new(PostgresCreditRepo::new(pool.clone())),
            Arc::new(PostgresPricingRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        AppState::new(
            config.clone(),
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteBlockRepo::new(pool.clone())),
            Arc::new(SqliteSlotRepo::new(pool.clone())),
            Arc::new(SqliteTemplateRepo::new(pool.clone())),
            Arc::new(SqliteReservationRepo::new(pool.clone())),
            Arc::new(SqliteCreditRepo::new(pool.clone())),
            Arc::new(SqlitePricingRepo::new(pool)),
        )
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
