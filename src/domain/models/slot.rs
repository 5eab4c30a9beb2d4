use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::services::time_range::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Locked,
    Unlocked,
    Reserved,
    Cancelled,
    Blocked,
}

impl SlotStatus {
    /// Admin-driven transitions. Reserved is entered and left only through the
    /// reservation lifecycle, never by a direct status change.
    pub fn can_transition_to(self, next: SlotStatus) -> bool {
        use SlotStatus::*;
        matches!(
            (self, next),
            (Locked, Unlocked)
                | (Unlocked, Locked)
                | (Cancelled, Locked)
                | (Cancelled, Unlocked)
                | (Locked, Blocked)
                | (Unlocked, Blocked)
                | (Cancelled, Blocked)
        )
    }

    pub fn is_deletable(self) -> bool {
        self != SlotStatus::Reserved
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Slot {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: SlotStatus,
    pub assigned_user_id: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Slot {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime, status: SlotStatus) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            start_time,
            end_time,
            duration_minutes: TimeRange::from_times(start_time, end_time).duration_minutes() as i32,
            status,
            assigned_user_id: None,
            note: None,
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::from_times(self.start_time, self.end_time)
    }
}
