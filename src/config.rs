use chrono_tz::Tz;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub timezone: Tz, // Wall-clock zone of the trainer's schedule
    pub cancellation_window_hours: i64,
    pub min_booking_notice_minutes: i64,
    pub default_reservation_credits: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            timezone: env::var("TRAINER_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()).parse().expect("TRAINER_TIMEZONE must be an IANA zone name"),
            cancellation_window_hours: env::var("CANCELLATION_WINDOW_HOURS").unwrap_or_else(|_| "24".to_string()).parse().expect("CANCELLATION_WINDOW_HOURS must be a number"),
            min_booking_notice_minutes: env::var("MIN_BOOKING_NOTICE_MINUTES").unwrap_or_else(|_| "0".to_string()).parse().expect("MIN_BOOKING_NOTICE_MINUTES must be a number"),
            default_reservation_credits: env::var("DEFAULT_RESERVATION_CREDITS").unwrap_or_else(|_| "1".to_string()).parse().expect("DEFAULT_RESERVATION_CREDITS must be a number"),
        }
    }

    /// Baseline used by tests and tools that don't read the environment.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            port: 0,
            timezone: chrono_tz::UTC,
            cancellation_window_hours: 24,
            min_booking_notice_minutes: 0,
            default_reservation_credits: 1,
        }
    }
}
