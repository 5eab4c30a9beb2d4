use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::info;
use crate::domain::models::slot::{Slot, SlotStatus};
use crate::domain::models::template::SlotTemplate;
use crate::domain::ports::{SlotRepository, TemplateRepository};
use crate::domain::services::time_range::{validate_time_range, week_range, TimeRange};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct TemplateApplication {
    pub created_count: usize,
    pub slots: Vec<Slot>,
}

pub struct SlotChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub note: Option<String>,
}

/// Admin-side management of materialized slots and weekly templates.
pub struct SlotService {
    slot_repo: Arc<dyn SlotRepository>,
    template_repo: Arc<dyn TemplateRepository>,
}

impl SlotService {
    pub fn new(slot_repo: Arc<dyn SlotRepository>, template_repo: Arc<dyn TemplateRepository>) -> Self {
        Self { slot_repo, template_repo }
    }

    async fn find(&self, slot_id: &str) -> Result<Slot, AppError> {
        self.slot_repo.find_by_id(slot_id).await?
            .ok_or(AppError::NotFound(format!("Slot {} not found", slot_id)))
    }

    async fn ensure_free(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime, exclude_id: Option<&str>) -> Result<(), AppError> {
        let overlaps = self.slot_repo.find_overlap(date, start, end, exclude_id).await?;
        if !overlaps.is_empty() {
            return Err(AppError::InvalidState("Slot overlaps an existing slot".into()));
        }
        Ok(())
    }

    pub async fn create_slot(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime, locked: bool, note: Option<String>) -> Result<Slot, AppError> {
        validate_time_range(start, end)?;
        self.ensure_free(date, start, end, None).await?;

        let status = if locked { SlotStatus::Locked } else { SlotStatus::Unlocked };
        let slot = Slot { note, ..Slot::new(date, start, end, status) };
        let created = self.slot_repo.create(&slot).await?;

        info!("Created slot {} on {} {}-{}", created.id, created.date, created.start_time, created.end_time);
        Ok(created)
    }

    /// Edits the note and/or moves the slot. Reserved slots cannot move, and the new
    /// range may not overlap another live slot.
    pub async fn update_slot(&self, slot_id: &str, changes: SlotChanges) -> Result<Slot, AppError> {
        let mut slot = self.find(slot_id).await?;

        let date = changes.date.unwrap_or(slot.date);
        let start = changes.start_time.unwrap_or(slot.start_time);
        let end = changes.end_time.unwrap_or(slot.end_time);
        let moved = date != slot.date || start != slot.start_time || end != slot.end_time;

        if moved {
            if slot.status == SlotStatus::Reserved {
                return Err(AppError::InvalidState("Reserved slots cannot be moved".into()));
            }
            validate_time_range(start, end)?;
            self.ensure_free(date, start, end, Some(&slot.id)).await?;

            slot.date = date;
            slot.start_time = start;
            slot.end_time = end;
            slot.duration_minutes = TimeRange::from_times(start, end).duration_minutes() as i32;
        }
        if let Some(note) = changes.note {
            slot.note = if note.is_empty() { None } else { Some(note) };
        }

        let updated = self.slot_repo.update_schedule(&slot).await?;
        info!("Updated slot {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_slot(&self, slot_id: &str) -> Result<(), AppError> {
        let slot = self.find(slot_id).await?;
        if !slot.status.is_deletable() {
            return Err(AppError::InvalidState("Reserved slots cannot be deleted".into()));
        }
        if !self.slot_repo.delete(slot_id).await? {
            return Err(AppError::InvalidState("Slot was reserved concurrently".into()));
        }
        info!("Deleted slot {}", slot_id);
        Ok(())
    }

    async fn transition(&self, slot_id: &str, next: SlotStatus) -> Result<Slot, AppError> {
        let slot = self.find(slot_id).await?;
        if slot.status == next {
            return Ok(slot);
        }
        if !slot.status.can_transition_to(next) {
            return Err(AppError::InvalidState(format!("Cannot move slot from {:?} to {:?}", slot.status, next)));
        }
        // A cancelled slot's range may have been reused while it was out of play.
        if slot.status == SlotStatus::Cancelled {
            self.ensure_free(slot.date, slot.start_time, slot.end_time, Some(&slot.id)).await?;
        }

        let updated = self.slot_repo.transition(slot_id, slot.status, next).await?
            .ok_or(AppError::InvalidState("Slot changed concurrently".into()))?;
        info!("Slot {} moved {:?} -> {:?}", slot_id, slot.status, next);
        Ok(updated)
    }

    pub async fn lock_slot(&self, slot_id: &str) -> Result<Slot, AppError> {
        self.transition(slot_id, SlotStatus::Locked).await
    }

    pub async fn unlock_slot(&self, slot_id: &str) -> Result<Slot, AppError> {
        self.transition(slot_id, SlotStatus::Unlocked).await
    }

    pub async fn block_slot(&self, slot_id: &str) -> Result<Slot, AppError> {
        self.transition(slot_id, SlotStatus::Blocked).await
    }

    pub async fn list_slots(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Slot>, AppError> {
        if from > to {
            return Err(AppError::Validation("Range start must not be after its end".into()));
        }
        self.slot_repo.list_by_range(from, to).await
    }

    pub async fn create_template(&self, name: String, description: Option<String>, definitions: Vec<(i32, NaiveTime, i32)>) -> Result<SlotTemplate, AppError> {
        let template = SlotTemplate::new(name, description, definitions);
        template.validate()?;
        let created = self.template_repo.create(&template).await?;
        info!("Created template {} ({}) with {} slots", created.id, created.name, created.entries.len());
        Ok(created)
    }

    pub async fn get_template(&self, template_id: &str) -> Result<SlotTemplate, AppError> {
        self.template_repo.find_by_id(template_id).await?
            .ok_or(AppError::NotFound(format!("Template {} not found", template_id)))
    }

    pub async fn list_templates(&self) -> Result<Vec<SlotTemplate>, AppError> {
        self.template_repo.list().await
    }

    /// Slots already materialized from the template are left in place.
    pub async fn delete_template(&self, template_id: &str) -> Result<(), AppError> {
        self.template_repo.delete(template_id).await?;
        info!("Deleted template {}", template_id);
        Ok(())
    }

    /// Materializes the template into the given week. Definitions whose range is
    /// already taken by a live slot are skipped, so re-applying is a no-op.
    pub async fn apply_template(&self, template_id: &str, week_start: NaiveDate) -> Result<TemplateApplication, AppError> {
        let template = self.get_template(template_id).await?;

        let candidates = template.materialize(week_start);
        let slots = self.slot_repo.create_many_skipping_overlaps(&candidates).await?;

        info!(
            "Applied template {} to week of {}: {} of {} slots created",
            template.id, week_start, slots.len(), candidates.len()
        );
        Ok(TemplateApplication { created_count: slots.len(), slots })
    }

    pub async fn unlock_week(&self, week_start: NaiveDate) -> Result<u64, AppError> {
        let (from, to) = week_range(week_start);
        let unlocked = self.slot_repo.unlock_range(from, to).await?;
        info!("Unlocked {} slots for week of {}", unlocked, week_start);
        Ok(unlocked)
    }
}
