use crate::entities::{
    EquipmentStatus, equipment_entity as equipment, maintenance_log_entity as maintenance,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEquipmentRequest {
    #[schema(example = "Treadmill #3")]
    pub name: String,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    /// 缺省为 operational
    pub status: Option<EquipmentStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EquipmentResponse {
    pub id: i64,
    pub name: String,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub status: EquipmentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<equipment::Model> for EquipmentResponse {
    fn from(e: equipment::Model) -> Self {
        Self {
            id: e.id,
            name: e.name,
            purchase_date: e.purchase_date,
            warranty_expiry: e.warranty_expiry,
            status: e.status,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EquipmentStatusQuery {
    pub status: EquipmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRequest {
    /// 缺省为当天
    pub service_date: Option<NaiveDate>,
    pub cost_cents: Option<i64>,
    pub description: Option<String>,
    pub technician_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceLogResponse {
    pub id: i64,
    pub equipment_id: i64,
    pub service_date: NaiveDate,
    pub cost_cents: Option<i64>,
    pub description: Option<String>,
    pub technician_name: Option<String>,
}

impl From<maintenance::Model> for MaintenanceLogResponse {
    fn from(m: maintenance::Model) -> Self {
        Self {
            id: m.id,
            equipment_id: m.equipment_id,
            service_date: m.service_date,
            cost_cents: m.cost_cents,
            description: m.description,
            technician_name: m.technician_name,
        }
    }
}
