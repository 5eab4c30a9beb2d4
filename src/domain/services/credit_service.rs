use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::models::credit::{CreditBalance, CreditTransaction, CreditTransactionType, LedgerAudit};
use crate::domain::models::pricing::PricingKind;
use crate::domain::ports::{CreditRepository, PricingRepository, UserRepository};
use crate::error::AppError;

/// Every balance change goes through a ledger append; nothing writes a balance directly.
pub struct CreditService {
    credit_repo: Arc<dyn CreditRepository>,
    user_repo: Arc<dyn UserRepository>,
    pricing_repo: Arc<dyn PricingRepository>,
}

impl CreditService {
    pub fn new(
        credit_repo: Arc<dyn CreditRepository>,
        user_repo: Arc<dyn UserRepository>,
        pricing_repo: Arc<dyn PricingRepository>,
    ) -> Self {
        Self { credit_repo, user_repo, pricing_repo }
    }

    async fn ensure_user(&self, user_id: &str) -> Result<(), AppError> {
        self.user_repo.find_by_id(user_id).await?
            .ok_or(AppError::NotFound(format!("User {} not found", user_id)))?;
        Ok(())
    }

    pub async fn balance(&self, user_id: &str) -> Result<CreditBalance, AppError> {
        self.ensure_user(user_id).await?;
        let balance = self.credit_repo.balance(user_id).await?;
        Ok(CreditBalance { user_id: user_id.to_string(), balance })
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<CreditTransaction>, AppError> {
        self.ensure_user(user_id).await?;
        self.credit_repo.list_transactions(user_id).await
    }

    /// Signed admin correction, recorded as its own transaction.
    pub async fn adjust_credits(&self, user_id: &str, amount: i64, note: Option<String>) -> Result<i64, AppError> {
        if amount == 0 {
            return Err(AppError::Validation("Adjustment amount must not be zero".into()));
        }
        self.ensure_user(user_id).await?;

        let entry = CreditTransaction {
            note,
            ..CreditTransaction::new(user_id.to_string(), amount, CreditTransactionType::AdminAdjustment)
        };
        let balance = self.credit_repo.append(&entry).await?;

        info!("Adjusted credits for user {} by {} (balance {})", user_id, amount, balance);
        Ok(balance)
    }

    /// Re-entry point for the payment gateway webhook. Replays of the same external
    /// payment id leave the ledger untouched.
    pub async fn add_credits_from_payment(&self, user_id: &str, package_id: &str, external_payment_id: &str) -> Result<i64, AppError> {
        if external_payment_id.trim().is_empty() {
            return Err(AppError::Validation("External payment id is required".into()));
        }
        self.ensure_user(user_id).await?;

        let package = self.pricing_repo.find_by_id(package_id).await?
            .ok_or(AppError::NotFound(format!("Credit package {} not found", package_id)))?;
        if package.kind != PricingKind::CreditPackage {
            return Err(AppError::Validation(format!("Pricing item {} is not a credit package", package_id)));
        }

        let entry = CreditTransaction {
            reference_id: Some(package.id.clone()),
            external_payment_id: Some(external_payment_id.to_string()),
            note: Some(package.name.clone()),
            ..CreditTransaction::new(user_id.to_string(), package.credits, CreditTransactionType::Purchase)
        };
        let balance = self.credit_repo.append_payment(&entry).await?;

        info!("Payment {} credited {} credits to user {} (balance {})", external_payment_id, package.credits, user_id, balance);
        Ok(balance)
    }

    /// Spends credits on a training plan.
    pub async fn purchase_plan(&self, user_id: &str, plan_id: &str, credits: i64) -> Result<i64, AppError> {
        if credits <= 0 {
            return Err(AppError::Validation("Plan price must be positive".into()));
        }
        self.ensure_user(user_id).await?;

        let entry = CreditTransaction {
            reference_id: Some(plan_id.to_string()),
            ..CreditTransaction::new(user_id.to_string(), -credits, CreditTransactionType::PlanPurchase)
        };
        let balance = self.credit_repo.append(&entry).await?;

        info!("User {} bought plan {} for {} credits", user_id, plan_id, credits);
        Ok(balance)
    }

    pub async fn verify_ledger(&self, user_id: &str) -> Result<LedgerAudit, AppError> {
        self.ensure_user(user_id).await?;
        let balance = self.credit_repo.balance(user_id).await?;
        let transaction_sum = self.credit_repo.transaction_sum(user_id).await?;

        if balance != transaction_sum {
            warn!("Ledger drift for user {}: balance {} vs transactions {}", user_id, balance, transaction_sum);
        }

        Ok(LedgerAudit {
            user_id: user_id.to_string(),
            balance,
            transaction_sum,
            consistent: balance == transaction_sum,
        })
    }
}
