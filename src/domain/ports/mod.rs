use crate::domain::models::{
    block::AvailabilityBlock, slot::{Slot, SlotStatus}, template::SlotTemplate,
    reservation::Reservation, credit::CreditTransaction, pricing::PricingItem, user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn create(&self, block: &AvailabilityBlock) -> Result<AvailabilityBlock, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilityBlock>, AppError>;
    async fn list(&self) -> Result<Vec<AvailabilityBlock>, AppError>;
    /// Active blocks whose weekday set or specific date could match `date`.
    async fn list_active_for_date(&self, date: NaiveDate) -> Result<Vec<AvailabilityBlock>, AppError>;
    async fn update(&self, block: &AvailabilityBlock) -> Result<AvailabilityBlock, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn create(&self, slot: &Slot) -> Result<Slot, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Slot>, AppError>;
    async fn list_by_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Slot>, AppError>;
    /// Non-cancelled slots on `date` overlapping `[start, end)`, optionally ignoring one slot.
    async fn find_overlap(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime, exclude_id: Option<&str>) -> Result<Vec<Slot>, AppError>;
    async fn update_schedule(&self, slot: &Slot) -> Result<Slot, AppError>;
    /// Compare-and-set on the status column; `None` when the slot is no longer in `expected`.
    async fn transition(&self, id: &str, expected: SlotStatus, next: SlotStatus) -> Result<Option<Slot>, AppError>;
    /// Deletes unless Reserved; returns false when the guard rejected the delete.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    /// Inserts each slot whose range is free, atomically; returns the ones created.
    async fn create_many_skipping_overlaps(&self, slots: &[Slot]) -> Result<Vec<Slot>, AppError>;
    async fn unlock_range(&self, from: NaiveDate, to: NaiveDate) -> Result<u64, AppError>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, template: &SlotTemplate) -> Result<SlotTemplate, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SlotTemplate>, AppError>;
    async fn list(&self) -> Result<Vec<SlotTemplate>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Claims the slot (if any), applies the debit (if any) and inserts the reservation
    /// as one transaction. Rejects a range overlapping the user's confirmed reservations.
    async fn create_with_debit(&self, reservation: &Reservation, debit: Option<&CreditTransaction>) -> Result<Reservation, AppError>;
    /// Flips a Confirmed reservation to Cancelled, releases its slot and applies the
    /// refund (if any) as one transaction.
    async fn cancel_with_refund(&self, reservation: &Reservation, cancelled_at: DateTime<Utc>, refund: Option<&CreditTransaction>) -> Result<Reservation, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError>;
    async fn list_confirmed_by_date(&self, date: NaiveDate) -> Result<Vec<Reservation>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Reservation>, AppError>;
    async fn list_by_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Reservation>, AppError>;
}

#[async_trait]
pub trait CreditRepository: Send + Sync {
    async fn balance(&self, user_id: &str) -> Result<i64, AppError>;
    async fn transaction_sum(&self, user_id: &str) -> Result<i64, AppError>;
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<CreditTransaction>, AppError>;
    /// Appends the entry and moves the balance with it; rejects a result below zero.
    async fn append(&self, entry: &CreditTransaction) -> Result<i64, AppError>;
    /// Like `append`, but a replayed `external_payment_id` is a no-op returning the balance.
    async fn append_payment(&self, entry: &CreditTransaction) -> Result<i64, AppError>;
}

#[async_trait]
pub trait PricingRepository: Send + Sync {
    async fn create(&self, item: &PricingItem) -> Result<PricingItem, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<PricingItem>, AppError>;
    async fn list(&self) -> Result<Vec<PricingItem>, AppError>;
}
