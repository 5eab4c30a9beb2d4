use crate::domain::{models::{credit::CreditTransaction, reservation::Reservation}, ports::ReservationRepository};
use crate::error::{is_unique_violation, AppError};
use crate::infra::repositories::sqlite_credit_repo::apply_ledger_entry;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

pub struct SqliteReservationRepo {
    pool: SqlitePool,
}

impl SqliteReservationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepo {
    async fn create_with_debit(&self, reservation: &Reservation, debit: Option<&CreditTransaction>) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(AppError::Database)?;

        if let Some(slot_id) = &reservation.slot_id {
            let claimed = sqlx::query("UPDATE slots SET status = 'RESERVED', assigned_user_id = ? WHERE id = ? AND status = 'UNLOCKED'")
                .bind(&reservation.user_id)
                .bind(slot_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            if claimed.rows_affected() == 0 {
                return Err(AppError::InvalidState(format!("Slot {} is no longer unlocked", slot_id)));
            }
        }

        let clashing: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM reservations
               WHERE user_id = ? AND date = ? AND status = 'CONFIRMED'
               AND start_time < ? AND end_time > ?"#
        )
            .bind(&reservation.user_id)
            .bind(reservation.date)
            .bind(reservation.end_time)
            .bind(reservation.start_time)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if clashing > 0 {
            return Err(AppError::InvalidState("You already hold a reservation overlapping this time".into()));
        }

        if let Some(block_id) = &reservation.block_id {
            let taken: i64 = sqlx::query_scalar(
                r#"SELECT COUNT(*) FROM reservations
                   WHERE block_id = ? AND date = ? AND status = 'CONFIRMED'
                   AND start_time < ? AND end_time > ?"#
            )
                .bind(block_id)
                .bind(reservation.date)
                .bind(reservation.end_time)
                .bind(reservation.start_time)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            if taken > 0 {
                return Err(AppError::SlotUnavailable);
            }
        }

        if let Some(entry) = debit {
            apply_ledger_entry(&mut tx, entry).await?;
        }

        let created = sqlx::query_as::<_, Reservation>(
            r#"INSERT INTO reservations (id, user_id, block_id, slot_id, date, start_time, end_time, status, credits_used, pricing_item_id, note, created_at, cancelled_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&reservation.id).bind(&reservation.user_id).bind(&reservation.block_id).bind(&reservation.slot_id)
            .bind(reservation.date).bind(reservation.start_time).bind(reservation.end_time).bind(reservation.status)
            .bind(reservation.credits_used).bind(&reservation.pricing_item_id).bind(&reservation.note)
            .bind(reservation.created_at).bind(reservation.cancelled_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| if is_unique_violation(&e) { AppError::SlotUnavailable } else { AppError::Database(e) })?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn cancel_with_refund(&self, reservation: &Reservation, cancelled_at: DateTime<Utc>, refund: Option<&CreditTransaction>) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'CANCELLED', cancelled_at = ? WHERE id = ? AND status = 'CONFIRMED' RETURNING *"
        )
            .bind(cancelled_at)
            .bind(&reservation.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::AlreadyCancelled)?;

        if let Some(slot_id) = &cancelled.slot_id {
            sqlx::query("UPDATE slots SET status = 'CANCELLED', cancelled_at = ? WHERE id = ? AND status = 'RESERVED'")
                .bind(cancelled_at)
                .bind(slot_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        if let Some(entry) = refund {
            apply_ledger_entry(&mut tx, entry).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_confirmed_by_date(&self, date: NaiveDate) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE date = ? AND status = 'CONFIRMED' ORDER BY start_time ASC"
        )
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = ? ORDER BY date DESC, start_time DESC"
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE date >= ? AND date <= ? ORDER BY date ASC, start_time ASC"
        )
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
