use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditTransactionType {
    Purchase,
    Reservation,
    Refund,
    AdminAdjustment,
    PlanPurchase,
}

/// Immutable ledger entry. Positive amounts credit the user, negative amounts debit.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct CreditTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub transaction_type: CreditTransactionType,
    pub reference_id: Option<String>,
    pub external_payment_id: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    pub fn new(user_id: String, amount: i64, transaction_type: CreditTransactionType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            amount,
            transaction_type,
            reference_id: None,
            external_payment_id: None,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn reservation_debit(user_id: String, credits: i64, reservation_id: &str) -> Self {
        Self {
            reference_id: Some(reservation_id.to_string()),
            ..Self::new(user_id, -credits, CreditTransactionType::Reservation)
        }
    }

    pub fn reservation_refund(user_id: String, credits: i64, reservation_id: &str) -> Self {
        Self {
            reference_id: Some(reservation_id.to_string()),
            ..Self::new(user_id, credits, CreditTransactionType::Refund)
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreditBalance {
    pub user_id: String,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerAudit {
    pub user_id: String,
    pub balance: i64,
    pub transaction_sum: i64,
    pub consistent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_entries_reference_the_reservation() {
        let debit = CreditTransaction::reservation_debit("u1".into(), 2, "r1");
        assert_eq!(debit.amount, -2);
        assert_eq!(debit.transaction_type, CreditTransactionType::Reservation);
        assert_eq!(debit.reference_id.as_deref(), Some("r1"));

        let refund = CreditTransaction::reservation_refund("u1".into(), 2, "r1");
        assert_eq!(refund.amount, 2);
        assert_eq!(refund.transaction_type, CreditTransactionType::Refund);
        assert_ne!(refund.id, debit.id);
    }
}
