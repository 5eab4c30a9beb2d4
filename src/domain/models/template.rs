use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::slot::{Slot, SlotStatus};
use crate::domain::services::time_range::add_minutes;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SlotTemplate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub entries: Vec<TemplateEntry>,
}

/// One weekly slot definition: `day_offset` days after the week start.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TemplateEntry {
    pub id: String,
    pub template_id: String,
    pub position: i32,
    pub day_offset: i32,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
}

impl SlotTemplate {
    pub fn new(name: String, description: Option<String>, definitions: Vec<(i32, NaiveTime, i32)>) -> Self {
        let id = Uuid::new_v4().to_string();
        let entries = definitions
            .into_iter()
            .enumerate()
            .map(|(position, (day_offset, start_time, duration_minutes))| TemplateEntry {
                id: Uuid::new_v4().to_string(),
                template_id: id.clone(),
                position: position as i32,
                day_offset,
                start_time,
                duration_minutes,
            })
            .collect();

        Self {
            id,
            name,
            description,
            created_at: Utc::now(),
            entries,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Template name is required".into()));
        }
        for entry in &self.entries {
            if !(0..=6).contains(&entry.day_offset) {
                return Err(AppError::Validation(format!("Day offset {} out of range 0-6", entry.day_offset)));
            }
            if entry.duration_minutes <= 0 {
                return Err(AppError::Validation("Template slot duration must be positive".into()));
            }
            if entry.end_time().is_none() {
                return Err(AppError::Validation("Template slot must end on the same day".into()));
            }
        }
        Ok(())
    }

    /// Concrete slots for the week starting at `week_start`, in template order.
    /// New slots start Locked so the week can be released with unlock-week.
    pub fn materialize(&self, week_start: NaiveDate) -> Vec<Slot> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let end = entry.end_time()?;
                let date = week_start + Duration::days(entry.day_offset as i64);
                Some(Slot::new(date, entry.start_time, end, SlotStatus::Locked))
            })
            .collect()
    }
}

impl TemplateEntry {
    pub fn end_time(&self) -> Option<NaiveTime> {
        add_minutes(self.start_time, self.duration_minutes as i64)
    }
}
