use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::services::time_range::TimeRange;
use crate::error::AppError;

/// ISO weekdays (1 = Monday … 7 = Sunday) packed into a bitmask column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(transparent)]
pub struct WeekdaySet(i32);

impl WeekdaySet {
    pub fn from_iso_days(days: &[u32]) -> Result<Self, AppError> {
        let mut mask = 0;
        for &day in days {
            if !(1..=7).contains(&day) {
                return Err(AppError::Validation(format!("Weekday {} out of range 1-7", day)));
            }
            mask |= 1 << (day - 1);
        }
        Ok(Self(mask))
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iso_days(&self) -> Vec<u32> {
        (1..=7).filter(|day| self.0 & (1 << (day - 1)) != 0).collect()
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.iso_days().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = Vec::<u32>::deserialize(deserializer)?;
        WeekdaySet::from_iso_days(&days).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityBlock {
    pub id: String,
    pub name: Option<String>,
    pub days_of_week: WeekdaySet,
    pub specific_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub break_after_slots: Option<i32>,
    pub break_minutes: Option<i32>,
    pub is_recurring: bool,
    pub is_blocked: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewBlockParams {
    pub name: Option<String>,
    pub days_of_week: WeekdaySet,
    pub specific_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub break_after_slots: Option<i32>,
    pub break_minutes: Option<i32>,
    pub is_blocked: bool,
}

impl AvailabilityBlock {
    pub fn new(params: NewBlockParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            is_recurring: params.specific_date.is_none(),
            days_of_week: params.days_of_week,
            specific_date: params.specific_date,
            start_time: params.start_time,
            end_time: params.end_time,
            slot_duration_minutes: params.slot_duration_minutes,
            break_after_slots: params.break_after_slots,
            break_minutes: params.break_minutes,
            is_blocked: params.is_blocked,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn window(&self) -> TimeRange {
        TimeRange::from_times(self.start_time, self.end_time)
    }

    /// Whether this block contributes to (or, when blocked, masks) the given date.
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        match self.specific_date {
            Some(d) => d == date,
            None => self.is_recurring && self.days_of_week.contains(date.weekday()),
        }
    }

    /// The pause inserted after every N tiles, if both halves are configured.
    pub fn break_rule(&self) -> Option<(i64, i64)> {
        match (self.break_after_slots, self.break_minutes) {
            (Some(n), Some(m)) if n > 0 && m > 0 => Some((n as i64, m as i64)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.start_time >= self.end_time {
            return Err(AppError::Validation("Block start time must be before end time".into()));
        }
        if self.slot_duration_minutes <= 0 {
            return Err(AppError::Validation("Slot duration must be positive".into()));
        }
        if self.specific_date.is_none() && self.days_of_week.is_empty() {
            return Err(AppError::Validation("Block needs a specific date or at least one weekday".into()));
        }
        match (self.break_after_slots, self.break_minutes) {
            (None, None) => {}
            (Some(n), Some(m)) if n > 0 && m > 0 => {}
            _ => return Err(AppError::Validation("Break needs both a positive slot count and a positive length".into())),
        }

        let window = self.window().duration_minutes();
        let duration = self.slot_duration_minutes as i64;
        if duration > window {
            return Err(AppError::Validation("Slot duration is longer than the block".into()));
        }
        if self.break_rule().is_none() && window % duration != 0 {
            return Err(AppError::Validation(format!(
                "Slot duration of {} minutes does not evenly tile a {} minute block",
                duration, window
            )));
        }
        Ok(())
    }
}
