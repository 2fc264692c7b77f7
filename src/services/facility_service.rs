use crate::entities::{StaffRole, class_schedule_entity as schedule, facility_room_entity as room};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{Credential, IdentityService};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

fn validate_capacity(capacity: i32) -> AppResult<()> {
    if capacity <= 0 {
        return Err(AppError::ValidationError(
            "Room capacity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct FacilityService {
    pool: DatabaseConnection,
    identity: IdentityService,
}

impl FacilityService {
    pub fn new(pool: DatabaseConnection, identity: IdentityService) -> Self {
        Self { pool, identity }
    }

    pub async fn add_room(
        &self,
        credential: &Credential,
        request: CreateRoomRequest,
    ) -> AppResult<RoomResponse> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Room name is required".to_string()));
        }
        validate_capacity(request.capacity)?;

        let created = room::ActiveModel {
            name: Set(name.to_string()),
            capacity: Set(request.capacity),
            room_type: Set(request.room_type),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Room {} '{}' added (capacity {})", created.id, created.name, created.capacity);
        Ok(RoomResponse::from(created))
    }

    pub async fn list_rooms(&self) -> AppResult<Vec<RoomResponse>> {
        let rooms = room::Entity::find()
            .order_by_asc(room::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rooms.into_iter().map(RoomResponse::from).collect())
    }

    pub async fn update_room(
        &self,
        credential: &Credential,
        room_id: i64,
        request: UpdateRoomRequest,
    ) -> AppResult<RoomResponse> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;
        let r = room::Entity::find_by_id(room_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let mut am = r.into_active_model();
        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::ValidationError("Room name is required".to_string()));
            }
            am.name = Set(name);
        }
        if let Some(capacity) = request.capacity {
            validate_capacity(capacity)?;
            am.capacity = Set(capacity);
        }
        if let Some(room_type) = request.room_type {
            am.room_type = Set(Some(room_type));
        }
        let updated = am.update(&self.pool).await?;
        Ok(RoomResponse::from(updated))
    }

    pub async fn delete_room(&self, credential: &Credential, room_id: i64) -> AppResult<()> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;
        let r = room::Entity::find_by_id(room_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let in_use = schedule::Entity::find()
            .filter(schedule::Column::RoomId.eq(room_id))
            .count(&self.pool)
            .await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Room is used by {in_use} class schedule(s)"
            )));
        }

        r.delete(&self.pool).await?;
        log::info!("Room {room_id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DayOfWeek, TrainerStatus};
    use crate::services::ClassService;
    use crate::test_support::TestContext;
    use chrono::NaiveTime;

    fn room_request(name: &str, capacity: i32) -> CreateRoomRequest {
        CreateRoomRequest {
            name: name.to_string(),
            capacity,
            room_type: None,
        }
    }

    #[tokio::test]
    async fn test_room_crud() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = FacilityService::new(ctx.db.clone(), ctx.identity.clone());

        assert!(matches!(
            svc.add_room(&admin, room_request("Bad", 0)).await,
            Err(AppError::ValidationError(_))
        ));

        let r = svc.add_room(&admin, room_request("Studio", 12)).await.unwrap();
        let updated = svc
            .update_room(
                &admin,
                r.id,
                UpdateRoomRequest {
                    capacity: Some(20),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.capacity, 20);
        assert_eq!(updated.name, "Studio");

        assert_eq!(svc.list_rooms().await.unwrap().len(), 1);
        svc.delete_room(&admin, r.id).await.unwrap();
        assert!(svc.list_rooms().await.unwrap().is_empty());
        assert!(matches!(
            svc.delete_room(&admin, r.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_room_in_use_cannot_be_deleted() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = FacilityService::new(ctx.db.clone(), ctx.identity.clone());
        let classes = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let coach = ctx.trainer("coach@gym.io", TrainerStatus::Hired).await;
        let r = svc.add_room(&admin, room_request("Hall", 30)).await.unwrap();

        classes
            .create_schedule(
                &admin,
                CreateScheduleRequest {
                    trainer_id: coach.id,
                    room_id: r.id,
                    class_name: "Boxing".to_string(),
                    day_of_week: DayOfWeek::Monday,
                    start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                    end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            svc.delete_room(&admin, r.id).await,
            Err(AppError::Conflict(_))
        ));
    }
}
