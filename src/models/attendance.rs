use crate::entities::attendance_log_entity as attendance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceLogResponse {
    pub id: i64,
    pub member_id: i64,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
}

impl From<attendance::Model> for AttendanceLogResponse {
    fn from(a: attendance::Model) -> Self {
        Self {
            id: a.id,
            member_id: a.member_id,
            check_in: a.check_in,
            check_out: a.check_out,
        }
    }
}
