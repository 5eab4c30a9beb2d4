use crate::domain::{models::slot::{Slot, SlotStatus}, ports::SlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteSlotRepo {
    pool: SqlitePool,
}

impl SqliteSlotRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_slot(conn: &mut SqliteConnection, slot: &Slot) -> Result<Slot, AppError> {
    sqlx::query_as::<_, Slot>(
        r#"INSERT INTO slots (id, date, start_time, end_time, duration_minutes, status, assigned_user_id, note, created_at, cancelled_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
           RETURNING *"#
    )
        .bind(&slot.id).bind(slot.date).bind(slot.start_time).bind(slot.end_time)
        .bind(slot.duration_minutes).bind(slot.status).bind(&slot.assigned_user_id)
        .bind(&slot.note).bind(slot.created_at).bind(slot.cancelled_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)
}

async fn count_overlap(conn: &mut SqliteConnection, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM slots WHERE date = ? AND start_time < ? AND end_time > ? AND status != 'CANCELLED'"
    )
        .bind(date)
        .bind(end)
        .bind(start)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)
}

#[async_trait]
impl SlotRepository for SqliteSlotRepo {
    async fn create(&self, slot: &Slot) -> Result<Slot, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        insert_slot(&mut conn, slot).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Slot>, AppError> {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Slot>, AppError> {
        sqlx::query_as::<_, Slot>(
            "SELECT * FROM slots WHERE date >= ? AND date <= ? ORDER BY date ASC, start_time ASC"
        )
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_overlap(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime, exclude_id: Option<&str>) -> Result<Vec<Slot>, AppError> {
        sqlx::query_as::<_, Slot>(
            r#"SELECT * FROM slots
               WHERE date = ? AND start_time < ? AND end_time > ? AND status != 'CANCELLED'
               AND (? IS NULL OR id != ?)"#
        )
            .bind(date)
            .bind(end)
            .bind(start)
            .bind(exclude_id)
            .bind(exclude_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_schedule(&self, slot: &Slot) -> Result<Slot, AppError> {
        sqlx::query_as::<_, Slot>(
            "UPDATE slots SET date=?, start_time=?, end_time=?, duration_minutes=?, note=? WHERE id=? RETURNING *"
        )
            .bind(slot.date).bind(slot.start_time).bind(slot.end_time)
            .bind(slot.duration_minutes).bind(&slot.note)
            .bind(&slot.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Slot not found".into()))
    }

    async fn transition(&self, id: &str, expected: SlotStatus, next: SlotStatus) -> Result<Option<Slot>, AppError> {
        sqlx::query_as::<_, Slot>(
            "UPDATE slots SET status = ?, assigned_user_id = NULL, cancelled_at = NULL WHERE id = ? AND status = ? RETURNING *"
        )
            .bind(next)
            .bind(id)
            .bind(expected)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM slots WHERE id = ? AND status != 'RESERVED'")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_many_skipping_overlaps(&self, slots: &[Slot]) -> Result<Vec<Slot>, AppError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(AppError::Database)?;
        let mut created = Vec::new();

        for slot in slots {
            if count_overlap(&mut tx, slot.date, slot.start_time, slot.end_time).await? > 0 {
                continue;
            }
            created.push(insert_slot(&mut tx, slot).await?);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn unlock_range(&self, from: NaiveDate, to: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE slots SET status = 'UNLOCKED' WHERE status = 'LOCKED' AND date >= ? AND date <= ?")
            .bind(from)
            .bind(to)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
