use crate::domain::models::block::WeekdaySet;
use crate::domain::models::pricing::PricingKind;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct DateRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub block_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub pricing_item_id: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminCancelRequest {
    #[serde(default)]
    pub refund_credits: bool,
}

#[derive(Deserialize)]
pub struct AdminReserveSlotRequest {
    pub user_id: String,
    #[serde(default = "default_true")]
    pub deduct_credits: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CreateBlockRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub days_of_week: WeekdaySet,
    pub specific_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub break_after_slots: Option<i32>,
    pub break_minutes: Option<i32>,
    #[serde(default)]
    pub is_blocked: bool,
}

#[derive(Deserialize)]
pub struct UpdateBlockRequest {
    pub name: Option<String>,
    pub days_of_week: Option<WeekdaySet>,
    pub specific_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub slot_duration_minutes: Option<i32>,
    pub break_after_slots: Option<i32>,
    pub break_minutes: Option<i32>,
    pub is_blocked: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateSlotRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_true")]
    pub locked: bool,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSlotRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct TemplateEntryRequest {
    pub day_offset: i32,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
}

#[derive(Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub description: Option<String>,
    pub entries: Vec<TemplateEntryRequest>,
}

#[derive(Deserialize)]
pub struct ApplyTemplateRequest {
    pub week_start: NaiveDate,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct AdjustCreditsRequest {
    pub amount: i64,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct PurchasePlanRequest {
    pub plan_id: String,
    pub credits: i64,
}

#[derive(Deserialize)]
pub struct PaymentWebhookRequest {
    pub user_id: String,
    pub package_id: String,
    pub external_payment_id: String,
}

#[derive(Deserialize)]
pub struct CreatePricingItemRequest {
    pub name: String,
    pub kind: PricingKind,
    pub credits: i64,
    #[serde(default)]
    pub price_cents: i64,
}
