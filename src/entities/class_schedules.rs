use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    #[sea_orm(string_value = "monday")]
    #[serde(alias = "MONDAY", alias = "Monday")]
    Monday,
    #[sea_orm(string_value = "tuesday")]
    #[serde(alias = "TUESDAY", alias = "Tuesday")]
    Tuesday,
    #[sea_orm(string_value = "wednesday")]
    #[serde(alias = "WEDNESDAY", alias = "Wednesday")]
    Wednesday,
    #[sea_orm(string_value = "thursday")]
    #[serde(alias = "THURSDAY", alias = "Thursday")]
    Thursday,
    #[sea_orm(string_value = "friday")]
    #[serde(alias = "FRIDAY", alias = "Friday")]
    Friday,
    #[sea_orm(string_value = "saturday")]
    #[serde(alias = "SATURDAY", alias = "Saturday")]
    Saturday,
    #[sea_orm(string_value = "sunday")]
    #[serde(alias = "SUNDAY", alias = "Sunday")]
    Sunday,
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayOfWeek::Monday => write!(f, "monday"),
            DayOfWeek::Tuesday => write!(f, "tuesday"),
            DayOfWeek::Wednesday => write!(f, "wednesday"),
            DayOfWeek::Thursday => write!(f, "thursday"),
            DayOfWeek::Friday => write!(f, "friday"),
            DayOfWeek::Saturday => write!(f, "saturday"),
            DayOfWeek::Sunday => write!(f, "sunday"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "class_schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub trainer_id: i64,
    pub room_id: i64,
    pub class_name: String,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
