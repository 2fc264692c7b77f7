use crate::entities::{
    EquipmentStatus, StaffRole, equipment_entity as equipment,
    maintenance_log_entity as maintenance,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{Credential, IdentityService};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct EquipmentService {
    pool: DatabaseConnection,
    identity: IdentityService,
}

impl EquipmentService {
    pub fn new(pool: DatabaseConnection, identity: IdentityService) -> Self {
        Self { pool, identity }
    }

    pub async fn add(
        &self,
        credential: &Credential,
        request: CreateEquipmentRequest,
    ) -> AppResult<EquipmentResponse> {
        self.require_admin(credential).await?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Equipment name is required".to_string()));
        }

        let created = equipment::ActiveModel {
            name: Set(name.to_string()),
            purchase_date: Set(request.purchase_date),
            warranty_expiry: Set(request.warranty_expiry),
            status: Set(request.status.unwrap_or(EquipmentStatus::Operational)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Equipment {} '{}' added", created.id, created.name);
        Ok(EquipmentResponse::from(created))
    }

    pub async fn list(&self, credential: &Credential) -> AppResult<Vec<EquipmentResponse>> {
        self.require_admin(credential).await?;
        let items = equipment::Entity::find()
            .order_by_asc(equipment::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(items.into_iter().map(EquipmentResponse::from).collect())
    }

    pub async fn update_status(
        &self,
        credential: &Credential,
        equipment_id: i64,
        status: EquipmentStatus,
    ) -> AppResult<EquipmentResponse> {
        self.require_admin(credential).await?;
        let e = find_equipment(&self.pool, equipment_id).await?;

        let previous = e.status;
        let mut am = e.into_active_model();
        am.status = Set(status);
        let e = am.update(&self.pool).await?;

        log::info!("Equipment {} status {} -> {}", e.id, previous, status);
        Ok(EquipmentResponse::from(e))
    }

    pub async fn delete(&self, credential: &Credential, equipment_id: i64) -> AppResult<()> {
        self.require_admin(credential).await?;

        let txn = self.pool.begin().await?;
        let e = find_equipment(&txn, equipment_id).await?;
        maintenance::Entity::delete_many()
            .filter(maintenance::Column::EquipmentId.eq(equipment_id))
            .exec(&txn)
            .await?;
        e.delete(&txn).await?;
        txn.commit().await?;

        log::info!("Equipment {equipment_id} deleted");
        Ok(())
    }

    /// 记录维护，同时把设备状态改为 maintenance
    pub async fn log_maintenance(
        &self,
        credential: &Credential,
        equipment_id: i64,
        request: MaintenanceRequest,
    ) -> AppResult<MaintenanceLogResponse> {
        self.require_admin(credential).await?;
        if request.cost_cents.is_some_and(|c| c < 0) {
            return Err(AppError::ValidationError("Cost cannot be negative".to_string()));
        }

        let txn = self.pool.begin().await?;
        let e = find_equipment(&txn, equipment_id).await?;

        let entry = maintenance::ActiveModel {
            equipment_id: Set(e.id),
            service_date: Set(request.service_date.unwrap_or_else(|| Utc::now().date_naive())),
            cost_cents: Set(request.cost_cents),
            description: Set(request.description),
            technician_name: Set(request.technician_name),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut am = e.into_active_model();
        am.status = Set(EquipmentStatus::Maintenance);
        am.update(&txn).await?;
        txn.commit().await?;

        log::info!("Maintenance logged for equipment {equipment_id}");
        Ok(MaintenanceLogResponse::from(entry))
    }

    pub async fn maintenance_history(
        &self,
        credential: &Credential,
        equipment_id: i64,
    ) -> AppResult<Vec<MaintenanceLogResponse>> {
        self.require_admin(credential).await?;
        find_equipment(&self.pool, equipment_id).await?;

        let logs = maintenance::Entity::find()
            .filter(maintenance::Column::EquipmentId.eq(equipment_id))
            .order_by_desc(maintenance::Column::ServiceDate)
            .order_by_desc(maintenance::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(logs.into_iter().map(MaintenanceLogResponse::from).collect())
    }

    async fn require_admin(&self, credential: &Credential) -> AppResult<()> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;
        Ok(())
    }
}

async fn find_equipment<C: ConnectionTrait>(
    db: &C,
    equipment_id: i64,
) -> AppResult<equipment::Model> {
    equipment::Entity::find_by_id(equipment_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Equipment not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use chrono::NaiveDate;

    fn treadmill() -> CreateEquipmentRequest {
        CreateEquipmentRequest {
            name: "Treadmill".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            warranty_expiry: NaiveDate::from_ymd_opt(2027, 3, 1),
            status: None,
        }
    }

    #[tokio::test]
    async fn test_add_defaults_to_operational() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = EquipmentService::new(ctx.db.clone(), ctx.identity.clone());

        let e = svc.add(&admin, treadmill()).await.unwrap();
        assert_eq!(e.status, EquipmentStatus::Operational);

        let e = svc
            .update_status(&admin, e.id, EquipmentStatus::Broken)
            .await
            .unwrap();
        assert_eq!(e.status, EquipmentStatus::Broken);
        assert_eq!(svc.list(&admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_maintenance_flips_status() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = EquipmentService::new(ctx.db.clone(), ctx.identity.clone());
        let e = svc.add(&admin, treadmill()).await.unwrap();

        let entry = svc
            .log_maintenance(
                &admin,
                e.id,
                MaintenanceRequest {
                    cost_cents: Some(12_000),
                    technician_name: Some("Bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(entry.service_date, Utc::now().date_naive());

        let listed = svc.list(&admin).await.unwrap();
        assert_eq!(listed[0].status, EquipmentStatus::Maintenance);
        assert_eq!(svc.maintenance_history(&admin, e.id).await.unwrap().len(), 1);

        assert!(matches!(
            svc.log_maintenance(&admin, 999, MaintenanceRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_history() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = EquipmentService::new(ctx.db.clone(), ctx.identity.clone());
        let e = svc.add(&admin, treadmill()).await.unwrap();
        svc.log_maintenance(&admin, e.id, MaintenanceRequest::default())
            .await
            .unwrap();

        svc.delete(&admin, e.id).await.unwrap();
        assert!(svc.list(&admin).await.unwrap().is_empty());
        assert!(matches!(
            svc.maintenance_history(&admin, e.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_member_cannot_manage_equipment() {
        let ctx = TestContext::new().await;
        let svc = EquipmentService::new(ctx.db.clone(), ctx.identity.clone());
        let (_, cred) = ctx
            .member("m@gym.io", crate::entities::MemberStatus::Active)
            .await;
        assert!(matches!(svc.list(&cred).await, Err(AppError::Forbidden(_))));
    }
}
