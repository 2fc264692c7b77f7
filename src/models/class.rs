use crate::entities::{
    BookingStatus, DayOfWeek, class_booking_entity as booking, class_schedule_entity as schedule,
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateScheduleRequest {
    pub trainer_id: i64,
    pub room_id: i64,
    #[schema(example = "Morning Yoga")]
    pub class_name: String,
    pub day_of_week: DayOfWeek,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "10:00:00")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    pub id: i64,
    pub trainer_id: i64,
    pub room_id: i64,
    pub class_name: String,
    pub day_of_week: DayOfWeek,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
}

impl From<schedule::Model> for ScheduleResponse {
    fn from(s: schedule::Model) -> Self {
        Self {
            id: s.id,
            trainer_id: s.trainer_id,
            room_id: s.room_id,
            class_name: s.class_name,
            day_of_week: s.day_of_week,
            start_time: s.start_time,
            end_time: s.end_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub member_id: i64,
    pub schedule_id: i64,
    pub booked_at: DateTime<Utc>,
    pub status: BookingStatus,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            member_id: b.member_id,
            schedule_id: b.schedule_id,
            booked_at: b.booked_at,
            status: b.status,
        }
    }
}
