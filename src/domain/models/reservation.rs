use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::slot::Slot;
use crate::domain::services::time_range::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub block_id: Option<String>,
    pub slot_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub credits_used: i64,
    pub pricing_item_id: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

pub struct NewReservationParams {
    pub user_id: String,
    pub block_id: Option<String>,
    pub slot_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub credits_used: i64,
    pub pricing_item_id: Option<String>,
    pub note: Option<String>,
}

impl Reservation {
    pub fn new(params: NewReservationParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            block_id: params.block_id,
            slot_id: params.slot_id,
            date: params.date,
            start_time: params.start_time,
            end_time: params.end_time,
            status: ReservationStatus::Confirmed,
            credits_used: params.credits_used,
            pricing_item_id: params.pricing_item_id,
            note: params.note,
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }

    pub fn for_slot(slot: &Slot, user_id: String, credits_used: i64) -> Self {
        Self::new(NewReservationParams {
            user_id,
            block_id: None,
            slot_id: Some(slot.id.clone()),
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            credits_used,
            pricing_item_id: None,
            note: slot.note.clone(),
        })
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::from_times(self.start_time, self.end_time)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}
