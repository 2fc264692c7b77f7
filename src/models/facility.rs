use crate::entities::facility_room_entity as room;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    #[schema(example = "Studio A")]
    pub name: String,
    #[schema(example = 20)]
    pub capacity: i32,
    #[schema(example = "yoga")]
    pub room_type: Option<String>,
}

/// 只更新传入的字段
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub room_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub room_type: Option<String>,
}

impl From<room::Model> for RoomResponse {
    fn from(r: room::Model) -> Self {
        Self {
            id: r.id,
            name: r.name,
            capacity: r.capacity,
            room_type: r.room_type,
        }
    }
}
