use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingKind {
    /// Credits charged for one reservation.
    Session,
    /// Credits granted by one paid purchase.
    CreditPackage,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PricingItem {
    pub id: String,
    pub name: String,
    pub kind: PricingKind,
    pub credits: i64,
    pub price_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PricingItem {
    pub fn new(name: String, kind: PricingKind, credits: i64, price_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            kind,
            credits,
            price_cents,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
