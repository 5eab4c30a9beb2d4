use crate::domain::{models::block::AvailabilityBlock, ports::BlockRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

pub struct PostgresBlockRepo {
    pool: PgPool,
}

impl PostgresBlockRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockRepository for PostgresBlockRepo {
    async fn create(&self, block: &AvailabilityBlock) -> Result<AvailabilityBlock, AppError> {
        sqlx::query_as::<_, AvailabilityBlock>(
            r#"INSERT INTO availability_blocks (id, name, days_of_week, specific_date, start_time, end_time, slot_duration_minutes, break_after_slots, break_minutes, is_recurring, is_blocked, is_active, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
               RETURNING *"#
        )
            .bind(&block.id).bind(&block.name).bind(block.days_of_week).bind(block.specific_date)
            .bind(block.start_time).bind(block.end_time).bind(block.slot_duration_minutes)
            .bind(block.break_after_slots).bind(block.break_minutes).bind(block.is_recurring)
            .bind(block.is_blocked).bind(block.is_active).bind(block.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilityBlock>, AppError> {
        sqlx::query_as::<_, AvailabilityBlock>("SELECT * FROM availability_blocks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<AvailabilityBlock>, AppError> {
        sqlx::query_as::<_, AvailabilityBlock>("SELECT * FROM availability_blocks ORDER BY start_time ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active_for_date(&self, date: NaiveDate) -> Result<Vec<AvailabilityBlock>, AppError> {
        let weekday_bit = 1i32 << date.weekday().num_days_from_monday();
        sqlx::query_as::<_, AvailabilityBlock>(
            r#"SELECT * FROM availability_blocks
               WHERE is_active
               AND (specific_date = $1 OR (specific_date IS NULL AND is_recurring AND (days_of_week & $2) <> 0))
               ORDER BY start_time ASC"#
        )
            .bind(date)
            .bind(weekday_bit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, block: &AvailabilityBlock) -> Result<AvailabilityBlock, AppError> {
        sqlx::query_as::<_, AvailabilityBlock>(
            r#"UPDATE availability_blocks
               SET name=$1, days_of_week=$2, specific_date=$3, start_time=$4, end_time=$5, slot_duration_minutes=$6, break_after_slots=$7, break_minutes=$8, is_recurring=$9, is_blocked=$10, is_active=$11
               WHERE id=$12
               RETURNING *"#
        )
            .bind(&block.name).bind(block.days_of_week).bind(block.specific_date)
            .bind(block.start_time).bind(block.end_time).bind(block.slot_duration_minutes)
            .bind(block.break_after_slots).bind(block.break_minutes).bind(block.is_recurring)
            .bind(block.is_blocked).bind(block.is_active)
            .bind(&block.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Block not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM availability_blocks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Block not found".into()));
        }
        Ok(())
    }
}
