use crate::entities::{
    InvoiceStatus, SubscriptionStatus, invoice_entity as invoice,
    membership_plan_entity as plan,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: i64,
    pub name: String,
    pub duration_days: i32,
    pub base_fee_cents: i64,
    pub discounted_fee_cents: i64,
}

impl From<plan::Model> for PlanResponse {
    fn from(p: plan::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            duration_days: p.duration_days,
            base_fee_cents: p.base_fee_cents,
            discounted_fee_cents: p.discounted_fee_cents,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ApplyQuery {
    /// 套餐名，大小写不敏感
    pub plan: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyResponse {
    pub subscription_id: i64,
    pub invoice_id: i64,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PayRequest {
    pub invoice_id: i64,
    #[schema(example = 5900)]
    pub amount_cents: i64,
    #[schema(example = "card")]
    pub payment_method: String,
    pub transaction_ref: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub payment_id: i64,
    pub invoice_id: i64,
    pub amount_paid_cents: i64,
    pub transaction_ref: String,
    pub invoice_status: InvoiceStatus,
    pub subscription_status: SubscriptionStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionView {
    pub subscription_id: i64,
    pub plan_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentSubscriptionResponse {
    pub has_subscription: bool,
    pub subscription: Option<SubscriptionView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: i64,
    pub subscription_id: i64,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
}

impl InvoiceResponse {
    /// 状态按 today 计算 (过期未付显示 overdue)
    pub fn from_model(m: invoice::Model, today: NaiveDate) -> Self {
        let status = m.effective_status(today);
        Self {
            id: m.id,
            subscription_id: m.subscription_id,
            amount_cents: m.amount_cents,
            due_date: m.due_date,
            status,
        }
    }
}
