use crate::domain::{models::credit::CreditTransaction, ports::CreditRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use tracing::warn;
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteCreditRepo {
    pool: SqlitePool,
}

impl SqliteCreditRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A repeated payment id is a no-op for the user it was credited to, and an
    /// error for anyone else.
    async fn replayed_balance(&self, entry: &CreditTransaction, owner: &str) -> Result<i64, AppError> {
        if owner != entry.user_id {
            warn!(
                "Payment {:?} for user {} was already credited to user {}",
                entry.external_payment_id, entry.user_id, owner
            );
            return Err(AppError::InvalidState("Payment already credited to another user".into()));
        }
        self.balance(&entry.user_id).await
    }
}

/// Moves the balance and records the entry on the caller's connection, so it
/// commits or rolls back with whatever else the caller's transaction does.
/// A debit that would take the balance below zero matches no row.
pub(crate) async fn apply_ledger_entry(conn: &mut SqliteConnection, entry: &CreditTransaction) -> Result<i64, AppError> {
    let balance = if entry.amount < 0 {
        sqlx::query_scalar::<_, i64>(
            r#"UPDATE user_credits SET balance = balance + ?, updated_at = ?
               WHERE user_id = ? AND balance + ? >= 0
               RETURNING balance"#
        )
            .bind(entry.amount)
            .bind(entry.created_at)
            .bind(&entry.user_id)
            .bind(entry.amount)
            .fetch_optional(&mut *conn)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::InsufficientCredits)?
    } else {
        sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO user_credits (user_id, balance, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET balance = user_credits.balance + excluded.balance, updated_at = excluded.updated_at
               RETURNING balance"#
        )
            .bind(&entry.user_id)
            .bind(entry.amount)
            .bind(entry.created_at)
            .fetch_one(&mut *conn)
            .await
            .map_err(AppError::Database)?
    };

    sqlx::query(
        r#"INSERT INTO credit_transactions (id, user_id, amount, transaction_type, reference_id, external_payment_id, note, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#
    )
        .bind(&entry.id).bind(&entry.user_id).bind(entry.amount).bind(entry.transaction_type)
        .bind(&entry.reference_id).bind(&entry.external_payment_id).bind(&entry.note).bind(entry.created_at)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    Ok(balance)
}

#[async_trait]
impl CreditRepository for SqliteCreditRepo {
    async fn balance(&self, user_id: &str) -> Result<i64, AppError> {
        let balance = sqlx::query_scalar::<_, i64>("SELECT balance FROM user_credits WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(balance.unwrap_or(0))
    }

    async fn transaction_sum(&self, user_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(amount), 0) FROM credit_transactions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<CreditTransaction>, AppError> {
        sqlx::query_as::<_, CreditTransaction>(
            "SELECT * FROM credit_transactions WHERE user_id = ? ORDER BY created_at DESC"
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn append(&self, entry: &CreditTransaction) -> Result<i64, AppError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(AppError::Database)?;
        let balance = apply_ledger_entry(&mut tx, entry).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(balance)
    }

    async fn append_payment(&self, entry: &CreditTransaction) -> Result<i64, AppError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(AppError::Database)?;

        let credited_to = sqlx::query_scalar::<_, String>("SELECT user_id FROM credit_transactions WHERE external_payment_id = ?")
            .bind(&entry.external_payment_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if let Some(owner) = credited_to {
            drop(tx);
            return self.replayed_balance(entry, &owner).await;
        }

        match apply_ledger_entry(&mut tx, entry).await {
            Ok(balance) => {
                tx.commit().await.map_err(AppError::Database)?;
                Ok(balance)
            }
            // Lost the race against a concurrent delivery of the same payment.
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                drop(tx);
                let owner = sqlx::query_scalar::<_, String>("SELECT user_id FROM credit_transactions WHERE external_payment_id = ?")
                    .bind(&entry.external_payment_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(AppError::Database)?;
                self.replayed_balance(entry, &owner).await
            }
            Err(e) => Err(e),
        }
    }
}
