use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use crate::config::Config;
use crate::domain::models::block::AvailabilityBlock;
use crate::domain::models::reservation::Reservation;
use crate::domain::ports::{BlockRepository, ReservationRepository};
use crate::domain::services::time_range::{local_to_utc, TimeRange};
use crate::error::AppError;

/// A bookable range computed for a client, tagged with the block that offers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableSlot {
    pub block_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Fixed grid from the window start; a trailing partial tile is dropped.
fn grid_tiles(window: TimeRange, duration: i64, break_rule: Option<(i64, i64)>) -> Vec<TimeRange> {
    let mut tiles = Vec::new();
    let mut cursor = window.start;

    while cursor + duration <= window.end {
        tiles.push(TimeRange::new(cursor, cursor + duration));
        cursor += duration;

        if let Some((every, pause)) = break_rule
            && tiles.len() as i64 % every == 0 {
            cursor += pause;
        }
    }
    tiles
}

/// Candidates that stick to existing reservations: one before the earliest, one after
/// the latest, and one on each side of every gap that the duration divides evenly.
fn sticky_tiles(window: TimeRange, duration: i64, booked: &[TimeRange]) -> Vec<TimeRange> {
    let mut booked = booked.to_vec();
    booked.sort();

    let mut candidates = Vec::new();

    if let Some(earliest) = booked.first() {
        candidates.push(TimeRange::new(earliest.start - duration, earliest.start));
    }
    if let Some(latest_end) = booked.iter().map(|r| r.end).max() {
        candidates.push(TimeRange::new(latest_end, latest_end + duration));
    }

    for pair in booked.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        let gap = later.start - earlier.end;
        if gap >= duration && gap % duration == 0 {
            candidates.push(TimeRange::new(earlier.end, earlier.end + duration));
            candidates.push(TimeRange::new(later.start - duration, later.start));
        }
    }

    candidates.retain(|c| window.contains(c) && !booked.iter().any(|b| b.overlaps(c)));
    candidates.sort();
    candidates.dedup_by_key(|c| c.start);
    candidates
}

/// Bookable ranges of a single block given the confirmed reservations placed on it.
pub fn calculate_block_slots(block: &AvailabilityBlock, booked: &[TimeRange]) -> Vec<TimeRange> {
    let duration = block.slot_duration_minutes as i64;
    if duration <= 0 {
        return Vec::new();
    }

    if booked.is_empty() {
        grid_tiles(block.window(), duration, block.break_rule())
    } else {
        sticky_tiles(block.window(), duration, booked)
    }
}

/// Availability for `date` across every block. Blocked windows that apply to the date
/// mask whatever overlaps them.
pub fn calculate_slots(
    date: NaiveDate,
    blocks: &[AvailabilityBlock],
    reservations: &[Reservation],
) -> Vec<AvailableSlot> {
    let applicable: Vec<&AvailabilityBlock> = blocks.iter().filter(|b| b.applies_to(date)).collect();

    let blackouts: Vec<TimeRange> = applicable.iter()
        .filter(|b| b.is_blocked)
        .map(|b| b.window())
        .collect();

    let mut valid_slots = Vec::new();

    for block in applicable.iter().filter(|b| !b.is_blocked) {
        let booked: Vec<TimeRange> = reservations.iter()
            .filter(|r| r.is_confirmed() && r.date == date && r.block_id.as_deref() == Some(block.id.as_str()))
            .map(Reservation::range)
            .collect();

        for range in calculate_block_slots(block, &booked) {
            if blackouts.iter().any(|b| b.overlaps(&range)) {
                continue;
            }
            if let Some((start_time, end_time)) = range.to_times() {
                valid_slots.push(AvailableSlot {
                    block_id: block.id.clone(),
                    date,
                    start_time,
                    end_time,
                });
            }
        }
    }

    valid_slots.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.block_id.cmp(&b.block_id)));
    valid_slots
}

pub struct AvailabilityService {
    block_repo: Arc<dyn BlockRepository>,
    reservation_repo: Arc<dyn ReservationRepository>,
    config: Config,
}

impl AvailabilityService {
    pub fn new(
        block_repo: Arc<dyn BlockRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        config: Config,
    ) -> Self {
        Self { block_repo, reservation_repo, config }
    }

    pub async fn compute_availability(&self, date: NaiveDate) -> Result<Vec<AvailableSlot>, AppError> {
        self.compute_availability_at(date, Utc::now()).await
    }

    /// Slots starting before `now` plus the booking notice are never offered.
    pub async fn compute_availability_at(&self, date: NaiveDate, now: DateTime<Utc>) -> Result<Vec<AvailableSlot>, AppError> {
        let blocks = self.block_repo.list_active_for_date(date).await?;
        let reservations = self.reservation_repo.list_confirmed_by_date(date).await?;

        let cutoff = now + Duration::minutes(self.config.min_booking_notice_minutes);
        let tz = self.config.timezone;

        let mut slots = calculate_slots(date, &blocks, &reservations);
        slots.retain(|slot| {
            local_to_utc(&tz, date, slot.start_time).is_ok_and(|start| start >= cutoff)
        });
        Ok(slots)
    }

    /// Recomputes availability and checks for the exact (start, end, block) triple.
    pub async fn validate_slot_for_reservation(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        block_id: &str,
    ) -> Result<bool, AppError> {
        let slots = self.compute_availability(date).await?;
        Ok(slots.iter().any(|s| s.block_id == block_id && s.start_time == start && s.end_time == end))
    }
}
