use crate::entities::{MemberStatus, member_entity as member};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub emergency_contact: Option<String>,
    pub dob: NaiveDate,
    pub status: MemberStatus,
    pub current_subscription_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<member::Model> for MemberResponse {
    fn from(m: member::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone: m.phone,
            emergency_contact: m.emergency_contact,
            dob: m.dob,
            status: m.status,
            current_subscription_id: m.current_subscription_id,
            created_at: m.created_at,
        }
    }
}
