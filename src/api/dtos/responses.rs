use crate::domain::models::credit::CreditTransaction;
use crate::domain::services::availability::AvailableSlot;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub slots: Vec<AvailableSlot>,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub user_id: String,
    pub balance: i64,
}

#[derive(Serialize)]
pub struct CreditAccountResponse {
    pub user_id: String,
    pub balance: i64,
    pub transactions: Vec<CreditTransaction>,
}

#[derive(Serialize)]
pub struct UnlockWeekResponse {
    pub week_start: NaiveDate,
    pub unlocked_count: u64,
}
