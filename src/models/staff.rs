use crate::entities::{StaffRole, TrainerStatus, staff_entity as staff, trainer_entity as trainer};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrainerResponse {
    pub id: i64,
    pub staff_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub short_description: Option<String>,
    pub commission_rate_bp: Option<i32>,
    pub status: TrainerStatus,
}

impl TrainerResponse {
    pub fn new(t: trainer::Model, s: &staff::Model) -> Self {
        Self {
            id: t.id,
            staff_id: t.staff_id,
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            email: s.email.clone(),
            specialization: t.specialization,
            short_description: t.short_description,
            commission_rate_bp: t.commission_rate_bp,
            status: t.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StaffResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: StaffRole,
    pub salary_cents: Option<i64>,
    pub shift_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<TrainerResponse>,
}

impl From<staff::Model> for StaffResponse {
    fn from(s: staff::Model) -> Self {
        Self {
            id: s.id,
            first_name: s.first_name,
            last_name: s.last_name,
            email: s.email,
            role: s.role,
            salary_cents: s.salary_cents,
            shift_details: s.shift_details,
            trainer: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct HireTrainerRequest {
    /// 提成比例，基点 (10000 = 100%)
    #[schema(example = 1500)]
    pub commission_rate_bp: Option<i32>,
}
