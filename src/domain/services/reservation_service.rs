use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};
use crate::config::Config;
use crate::domain::models::credit::CreditTransaction;
use crate::domain::models::pricing::PricingKind;
use crate::domain::models::reservation::{NewReservationParams, Reservation};
use crate::domain::models::slot::SlotStatus;
use crate::domain::ports::{
    BlockRepository, PricingRepository, ReservationRepository, SlotRepository, UserRepository,
};
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::booking_locks::BookingLocks;
use crate::domain::services::time_range::{local_to_utc, validate_time_range};
use crate::error::AppError;

pub struct ClientBookingRequest {
    pub user_id: String,
    pub block_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub pricing_item_id: Option<String>,
    pub note: Option<String>,
}

pub struct ReservationService {
    availability: Arc<AvailabilityService>,
    reservation_repo: Arc<dyn ReservationRepository>,
    block_repo: Arc<dyn BlockRepository>,
    slot_repo: Arc<dyn SlotRepository>,
    user_repo: Arc<dyn UserRepository>,
    pricing_repo: Arc<dyn PricingRepository>,
    locks: BookingLocks,
    config: Config,
}

impl ReservationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        availability: Arc<AvailabilityService>,
        reservation_repo: Arc<dyn ReservationRepository>,
        block_repo: Arc<dyn BlockRepository>,
        slot_repo: Arc<dyn SlotRepository>,
        user_repo: Arc<dyn UserRepository>,
        pricing_repo: Arc<dyn PricingRepository>,
        config: Config,
    ) -> Self {
        Self {
            availability,
            reservation_repo,
            block_repo,
            slot_repo,
            user_repo,
            pricing_repo,
            locks: BookingLocks::new(),
            config,
        }
    }

    async fn ensure_user(&self, user_id: &str) -> Result<(), AppError> {
        self.user_repo.find_by_id(user_id).await?
            .ok_or(AppError::NotFound(format!("User {} not found", user_id)))?;
        Ok(())
    }

    async fn credits_for(&self, pricing_item_id: Option<&str>) -> Result<i64, AppError> {
        let Some(id) = pricing_item_id else {
            return Ok(self.config.default_reservation_credits);
        };

        let item = self.pricing_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound(format!("Pricing item {} not found", id)))?;
        if item.kind != PricingKind::Session || !item.is_active {
            return Err(AppError::Validation(format!("Pricing item {} cannot be used for a reservation", id)));
        }
        Ok(item.credits)
    }

    /// Client self-service booking. Validation, debit and insert happen while holding
    /// the block-date lock, and the debit and insert commit together.
    pub async fn create_reservation(&self, request: ClientBookingRequest) -> Result<Reservation, AppError> {
        validate_time_range(request.start_time, request.end_time)?;
        self.ensure_user(&request.user_id).await?;
        self.block_repo.find_by_id(&request.block_id).await?
            .ok_or(AppError::NotFound(format!("Block {} not found", request.block_id)))?;

        let credits = self.credits_for(request.pricing_item_id.as_deref()).await?;

        let guard = self.locks.acquire(&request.block_id, request.date).await;
        let result = self.book_under_lock(request, credits).await;
        drop(guard);
        self.locks.prune();

        let created = result?;
        info!(
            "Reservation {} confirmed for user {} on {} {}-{} ({} credits)",
            created.id, created.user_id, created.date, created.start_time, created.end_time, created.credits_used
        );
        Ok(created)
    }

    async fn book_under_lock(&self, request: ClientBookingRequest, credits: i64) -> Result<Reservation, AppError> {
        let offered = self.availability
            .validate_slot_for_reservation(request.date, request.start_time, request.end_time, &request.block_id)
            .await?;
        if !offered {
            warn!(
                "Booking rejected: {} {}-{} on block {} is not offered",
                request.date, request.start_time, request.end_time, request.block_id
            );
            return Err(AppError::SlotUnavailable);
        }

        let reservation = Reservation::new(NewReservationParams {
            user_id: request.user_id,
            block_id: Some(request.block_id),
            slot_id: None,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            credits_used: credits,
            pricing_item_id: request.pricing_item_id,
            note: request.note,
        });

        let debit = (credits > 0)
            .then(|| CreditTransaction::reservation_debit(reservation.user_id.clone(), credits, &reservation.id));
        self.reservation_repo.create_with_debit(&reservation, debit.as_ref()).await
    }

    /// Number of block-date keys the booking lock map currently tracks.
    pub fn tracked_lock_keys(&self) -> usize {
        self.locks.len()
    }

    pub async fn cancel_reservation(&self, user_id: &str, reservation_id: &str) -> Result<Reservation, AppError> {
        self.cancel_reservation_at(user_id, reservation_id, Utc::now()).await
    }

    /// Client cancellation: owner only, and only while at least the configured window
    /// remains before the start. Exactly the window is still allowed.
    pub async fn cancel_reservation_at(&self, user_id: &str, reservation_id: &str, now: DateTime<Utc>) -> Result<Reservation, AppError> {
        let reservation = self.reservation_repo.find_by_id(reservation_id).await?
            .ok_or(AppError::NotFound(format!("Reservation {} not found", reservation_id)))?;

        if reservation.user_id != user_id {
            return Err(AppError::NotOwner);
        }
        if !reservation.is_confirmed() {
            return Err(AppError::AlreadyCancelled);
        }

        let starts_at = local_to_utc(&self.config.timezone, reservation.date, reservation.start_time)?;
        if starts_at - now < Duration::hours(self.config.cancellation_window_hours) {
            warn!("Cancellation of {} rejected: starts at {}", reservation.id, starts_at);
            return Err(AppError::CancellationWindowPassed);
        }

        let refund = (reservation.credits_used > 0).then(|| {
            CreditTransaction::reservation_refund(reservation.user_id.clone(), reservation.credits_used, &reservation.id)
        });
        let cancelled = self.reservation_repo.cancel_with_refund(&reservation, now, refund.as_ref()).await?;

        info!("Reservation {} cancelled by user {} ({} credits refunded)", cancelled.id, user_id, cancelled.credits_used);
        Ok(cancelled)
    }

    /// Admin cancellation: no ownership or window check; refund is the caller's call.
    pub async fn admin_cancel_reservation(&self, reservation_id: &str, refund_credits: bool) -> Result<Reservation, AppError> {
        let reservation = self.reservation_repo.find_by_id(reservation_id).await?
            .ok_or(AppError::NotFound(format!("Reservation {} not found", reservation_id)))?;

        if !reservation.is_confirmed() {
            return Err(AppError::AlreadyCancelled);
        }

        let refund = (refund_credits && reservation.credits_used > 0).then(|| {
            CreditTransaction::reservation_refund(reservation.user_id.clone(), reservation.credits_used, &reservation.id)
        });
        let cancelled = self.reservation_repo.cancel_with_refund(&reservation, Utc::now(), refund.as_ref()).await?;

        info!("Reservation {} cancelled by admin (refund: {})", cancelled.id, refund.is_some());
        Ok(cancelled)
    }

    /// Admin assigns a user to an Unlocked slot directly, bypassing availability.
    /// With `deduct_credits` the user pays the default reservation price.
    pub async fn admin_create_reservation(&self, slot_id: &str, user_id: &str, deduct_credits: bool) -> Result<Reservation, AppError> {
        self.ensure_user(user_id).await?;
        let slot = self.slot_repo.find_by_id(slot_id).await?
            .ok_or(AppError::NotFound(format!("Slot {} not found", slot_id)))?;

        if slot.status != SlotStatus::Unlocked {
            return Err(AppError::InvalidState(format!("Slot {} is {:?}, only unlocked slots can be reserved", slot.id, slot.status)));
        }

        let credits = if deduct_credits { self.config.default_reservation_credits } else { 0 };
        let reservation = Reservation::for_slot(&slot, user_id.to_string(), credits);

        let debit = (credits > 0)
            .then(|| CreditTransaction::reservation_debit(user_id.to_string(), credits, &reservation.id));
        let created = self.reservation_repo.create_with_debit(&reservation, debit.as_ref()).await?;

        info!("Admin reserved slot {} for user {} ({} credits)", slot.id, user_id, credits);
        Ok(created)
    }

    pub async fn get_reservation(&self, reservation_id: &str) -> Result<Reservation, AppError> {
        self.reservation_repo.find_by_id(reservation_id).await?
            .ok_or(AppError::NotFound(format!("Reservation {} not found", reservation_id)))
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, AppError> {
        self.reservation_repo.list_by_user(user_id).await
    }

    pub async fn list_by_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Reservation>, AppError> {
        if from > to {
            return Err(AppError::Validation("Range start must not be after its end".into()));
        }
        self.reservation_repo.list_by_range(from, to).await
    }
}
