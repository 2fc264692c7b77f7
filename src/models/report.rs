use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChurnRiskEntry {
    pub member_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// 最近一次入场，从未入场为 null
    pub last_check_in: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrainerPerformance {
    pub trainer_id: i64,
    pub name: String,
    pub classes_assigned: u64,
    /// 百分比，例如 15.0 表示 15%
    pub commission_rate: f64,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminStats {
    pub total_members: u64,
    pub active_members: u64,
    pub total_revenue_cents: i64,
}
