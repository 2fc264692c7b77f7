use crate::entities::{
    MemberStatus, StaffRole, TrainerStatus, member_entity as member, staff_entity as staff,
    trainer_entity as trainer,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{Credential, IdentityService};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

/// 提成比例上限 10000bp = 100%
const MAX_COMMISSION_BP: i32 = 10_000;

#[derive(Clone)]
pub struct StaffService {
    pool: DatabaseConnection,
    identity: IdentityService,
}

impl StaffService {
    pub fn new(pool: DatabaseConnection, identity: IdentityService) -> Self {
        Self { pool, identity }
    }

    pub async fn pending_members(&self, credential: &Credential) -> AppResult<Vec<MemberResponse>> {
        self.require_admin(credential).await?;
        let list = member::Entity::find()
            .filter(member::Column::Status.eq(MemberStatus::Pending))
            .order_by_asc(member::Column::CreatedAt)
            .order_by_asc(member::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(MemberResponse::from).collect())
    }

    pub async fn grant_member(
        &self,
        credential: &Credential,
        member_id: i64,
    ) -> AppResult<MemberResponse> {
        self.require_admin(credential).await?;
        self.set_member_status(member_id, MemberStatus::Active).await
    }

    pub async fn ban_member(
        &self,
        credential: &Credential,
        member_id: i64,
    ) -> AppResult<MemberResponse> {
        self.require_admin(credential).await?;
        self.set_member_status(member_id, MemberStatus::Banned).await
    }

    pub async fn pending_trainers(
        &self,
        credential: &Credential,
    ) -> AppResult<Vec<TrainerResponse>> {
        self.require_admin(credential).await?;
        let trainers = trainer::Entity::find()
            .filter(trainer::Column::Status.eq(TrainerStatus::Pending))
            .order_by_asc(trainer::Column::Id)
            .all(&self.pool)
            .await?;

        let staff_ids: Vec<i64> = trainers.iter().map(|t| t.staff_id).collect();
        let staff_by_id: HashMap<i64, staff::Model> = staff::Entity::find()
            .filter(staff::Column::Id.is_in(staff_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(trainers
            .into_iter()
            .filter_map(|t| {
                let s = staff_by_id.get(&t.staff_id)?;
                Some(TrainerResponse::new(t, s))
            })
            .collect())
    }

    pub async fn hire_trainer(
        &self,
        credential: &Credential,
        trainer_id: i64,
        request: HireTrainerRequest,
    ) -> AppResult<TrainerResponse> {
        self.require_admin(credential).await?;
        if let Some(bp) = request.commission_rate_bp
            && !(0..=MAX_COMMISSION_BP).contains(&bp)
        {
            return Err(AppError::ValidationError(
                "Commission rate must be between 0 and 10000 basis points".to_string(),
            ));
        }
        self.set_trainer_status(trainer_id, TrainerStatus::Hired, request.commission_rate_bp)
            .await
    }

    pub async fn reject_trainer(
        &self,
        credential: &Credential,
        trainer_id: i64,
    ) -> AppResult<TrainerResponse> {
        self.require_admin(credential).await?;
        self.set_trainer_status(trainer_id, TrainerStatus::Rejected, None)
            .await
    }

    async fn require_admin(&self, credential: &Credential) -> AppResult<()> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;
        Ok(())
    }

    async fn set_member_status(
        &self,
        member_id: i64,
        status: MemberStatus,
    ) -> AppResult<MemberResponse> {
        let m = member::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let previous = m.status;
        let mut am = m.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        let m = am.update(&self.pool).await?;

        log::info!("Member {} status {} -> {}", m.id, previous, status);
        Ok(MemberResponse::from(m))
    }

    async fn set_trainer_status(
        &self,
        trainer_id: i64,
        status: TrainerStatus,
        commission_rate_bp: Option<i32>,
    ) -> AppResult<TrainerResponse> {
        let t = trainer::Entity::find_by_id(trainer_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Trainer not found".to_string()))?;
        let s = staff::Entity::find_by_id(t.staff_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff profile not found".to_string()))?;

        let mut am = t.into_active_model();
        am.status = Set(status);
        if let Some(bp) = commission_rate_bp {
            am.commission_rate_bp = Set(Some(bp));
        }
        let t = am.update(&self.pool).await?;

        log::info!("Trainer {} ({}) is now {}", t.id, s.email, status);
        Ok(TrainerResponse::new(t, &s))
    }
}
