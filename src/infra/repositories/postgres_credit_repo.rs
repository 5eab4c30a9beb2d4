use crate::domain::{models::credit::CreditTransaction, ports::CreditRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use tracing::warn;
use sqlx::{PgConnection, PgPool};

pub struct PostgresCreditRepo {
    pool: PgPool,
}

impl PostgresCreditRepo {
    pub fn new(pool: PgPool) -> Self {
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

/// Same contract as the SQLite variant: balance and ledger row move together on
/// the caller's connection.
pub(crate) async fn apply_ledger_entry(conn: &mut PgConnection, entry: &CreditTransaction) -> Result<i64, AppError> {
    let balance = if entry.amount < 0 {
        sqlx::query_scalar::<_, i64>(
            r#"UPDATE user_credits SET balance = balance + $1, updated_at = $2
               WHERE user_id = $3 AND balance + $1 >= 0
               RETURNING balance"#
        )
            .bind(entry.amount)
            .bind(entry.created_at)
            .bind(&entry.user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::InsufficientCredits)?
    } else {
        sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO user_credits (user_id, balance, updated_at) VALUES ($1, $2, $3)
               ON CONFLICT (user_id) DO UPDATE SET balance = user_credits.balance + EXCLUDED.balance, updated_at = EXCLUDED.updated_at
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
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#
    )
        .bind(&entry.id).bind(&entry.user_id).bind(entry.amount).bind(entry.transaction_type)
        .bind(&entry.reference_id).bind(&entry.external_payment_id).bind(&entry.note).bind(entry.created_at)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    Ok(balance)
}

#[async_trait]
impl CreditRepository for PostgresCreditRepo {
    async fn balance(&self, user_id: &str) -> Result<i64, AppError> {
        let balance = sqlx::query_scalar::<_, i64>("SELECT balance FROM user_credits WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(balance.unwrap_or(0))
    }

    async fn transaction_sum(&self, user_id: &str) -> Result<i64, AppError> {
        // SUM over BIGINT yields NUMERIC in Postgres
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(amount), 0)::BIGINT FROM credit_transactions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<CreditTransaction>, AppError> {
        sqlx::query_as::<_, CreditTransaction>(
            "SELECT * FROM credit_transactions WHERE user_id = $1 ORDER BY created_at DESC"
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn append(&self, entry: &CreditTransaction) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let balance = apply_ledger_entry(&mut tx, entry).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(balance)
    }

    async fn append_payment(&self, entry: &CreditTransaction) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let credited_to = sqlx::query_scalar::<_, String>("SELECT user_id FROM credit_transactions WHERE external_payment_id = $1")
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
                let owner = sqlx::query_scalar::<_, String>("SELECT user_id FROM credit_transactions WHERE external_payment_id = $1")
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
