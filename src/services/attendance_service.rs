use crate::entities::{
    MemberStatus, StaffRole, SubscriptionStatus, attendance_log_entity as attendance,
    subscription_entity as subscription,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{Credential, IdentityService};
use crate::utils::{PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct AttendanceService {
    pool: DatabaseConnection,
    identity: IdentityService,
}

impl AttendanceService {
    pub fn new(pool: DatabaseConnection, identity: IdentityService) -> Self {
        Self { pool, identity }
    }

    /// 入场需要会员为 active，且当前订阅为 active 并未过结束日期
    pub async fn check_in(&self, credential: &Credential) -> AppResult<AttendanceLogResponse> {
        let m = self
            .identity
            .require_member_status(credential, MemberStatus::Active)
            .await?;
        let today = Utc::now().date_naive();

        let sub = match m.current_subscription_id {
            Some(id) => subscription::Entity::find_by_id(id).one(&self.pool).await?,
            None => None,
        };
        let usable = sub
            .map(|s| s.effective_status(today) == SubscriptionStatus::Active)
            .unwrap_or(false);
        if !usable {
            log::warn!("Member {} tried to check in without an active subscription", m.id);
            return Err(AppError::Forbidden(
                "An active subscription is required to check in".to_string(),
            ));
        }

        if self.open_log(m.id).await?.is_some() {
            return Err(AppError::Conflict("Already checked in".to_string()));
        }

        let created = attendance::ActiveModel {
            member_id: Set(m.id),
            check_in: Set(Utc::now()),
            check_out: Set(None),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Already checked in"))?;

        log::info!("Member {} checked in", m.id);
        Ok(AttendanceLogResponse::from(created))
    }

    pub async fn check_out(&self, credential: &Credential) -> AppResult<AttendanceLogResponse> {
        let m = self.identity.require_member(credential).await?;
        let open = self
            .open_log(m.id)
            .await?
            .ok_or_else(|| AppError::ValidationError("No active check-in found".to_string()))?;

        let mut am = open.into_active_model();
        am.check_out = Set(Some(Utc::now()));
        let closed = am.update(&self.pool).await?;

        log::info!("Member {} checked out", m.id);
        Ok(AttendanceLogResponse::from(closed))
    }

    pub async fn history(&self, credential: &Credential) -> AppResult<Vec<AttendanceLogResponse>> {
        let m = self.identity.require_member(credential).await?;
        let logs = attendance::Entity::find()
            .filter(attendance::Column::MemberId.eq(m.id))
            .order_by_desc(attendance::Column::CheckIn)
            .order_by_desc(attendance::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(logs.into_iter().map(AttendanceLogResponse::from).collect())
    }

    pub async fn all_logs(
        &self,
        credential: &Credential,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<AttendanceLogResponse>> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;

        let paginator = attendance::Entity::find()
            .order_by_desc(attendance::Column::CheckIn)
            .order_by_desc(attendance::Column::Id)
            .paginate(&self.pool, params.get_per_page());
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page_index()).await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(AttendanceLogResponse::from).collect(),
            params,
            total,
        ))
    }

    async fn open_log(&self, member_id: i64) -> AppResult<Option<attendance::Model>> {
        let open = attendance::Entity::find()
            .filter(attendance::Column::MemberId.eq(member_id))
            .filter(attendance::Column::CheckOut.is_null())
            .one(&self.pool)
            .await?;
        Ok(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{PlanService, SubscriptionService};
    use crate::test_support::TestContext;

    async fn active_member(ctx: &TestContext, email: &str) -> Credential {
        let plans = PlanService::new(ctx.db.clone());
        plans.seed_defaults().await.unwrap();
        let subs = SubscriptionService::new(ctx.db.clone(), ctx.identity.clone(), plans);
        let (_, cred) = ctx.member(email, MemberStatus::Pending).await;
        let applied = subs.apply(&cred, "Silver").await.unwrap();
        subs.pay(
            &cred,
            PayRequest {
                invoice_id: applied.invoice_id,
                amount_cents: applied.amount_cents,
                payment_method: "cash".to_string(),
                transaction_ref: None,
            },
        )
        .await
        .unwrap();
        cred
    }

    #[tokio::test]
    async fn test_check_in_requires_active_subscription() {
        let ctx = TestContext::new().await;
        let svc = AttendanceService::new(ctx.db.clone(), ctx.identity.clone());
        let (_, cred) = ctx.member("nosub@gym.io", MemberStatus::Active).await;

        assert!(matches!(svc.check_in(&cred).await, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_check_in_rejects_lapsed_subscription() {
        let ctx = TestContext::new().await;
        let svc = AttendanceService::new(ctx.db.clone(), ctx.identity.clone());
        let cred = active_member(&ctx, "lapsed@gym.io").await;

        // 仍是 active，但结束日期已过
        let sub = subscription::Entity::find()
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        let yesterday = Utc::now().date_naive() - chrono::Duration::days(1);
        let mut am = sub.into_active_model();
        am.start_date = Set(yesterday - chrono::Duration::days(30));
        am.end_date = Set(yesterday);
        am.update(&ctx.db).await.unwrap();

        assert!(matches!(svc.check_in(&cred).await, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_one_open_log_enforced_by_index() {
        let ctx = TestContext::new().await;
        let (m, _) = ctx.member("idx@gym.io", MemberStatus::Active).await;
        let open_log = |at: chrono::DateTime<Utc>| attendance::ActiveModel {
            member_id: Set(m.id),
            check_in: Set(at),
            check_out: Set(None),
            ..Default::default()
        };

        open_log(Utc::now()).insert(&ctx.db).await.unwrap();
        let err = open_log(Utc::now())
            .insert(&ctx.db)
            .await
            .map_err(|e| AppError::on_unique_violation(e, "Already checked in"))
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // 已离场的记录不受限制
        let at = Utc::now() - chrono::Duration::days(1);
        attendance::ActiveModel {
            member_id: Set(m.id),
            check_in: Set(at),
            check_out: Set(Some(at + chrono::Duration::hours(1))),
            ..Default::default()
        }
        .insert(&ctx.db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_check_in_out_cycle() {
        let ctx = TestContext::new().await;
        let svc = AttendanceService::new(ctx.db.clone(), ctx.identity.clone());
        let cred = active_member(&ctx, "gym@gym.io").await;

        assert!(matches!(
            svc.check_out(&cred).await,
            Err(AppError::ValidationError(_))
        ));

        svc.check_in(&cred).await.unwrap();
        assert!(matches!(svc.check_in(&cred).await, Err(AppError::Conflict(_))));

        let closed = svc.check_out(&cred).await.unwrap();
        assert!(closed.check_out.is_some());

        svc.check_in(&cred).await.unwrap();
        assert_eq!(svc.history(&cred).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_all_logs_admin_only_and_paginated() {
        let ctx = TestContext::new().await;
        let svc = AttendanceService::new(ctx.db.clone(), ctx.identity.clone());
        let admin = ctx.admin().await;
        let member = active_member(&ctx, "p@gym.io").await;

        for _ in 0..3 {
            svc.check_in(&member).await.unwrap();
            svc.check_out(&member).await.unwrap();
        }

        assert!(matches!(
            svc.all_logs(&member, &PaginationParams::default()).await,
            Err(AppError::Forbidden(_))
        ));

        let page = svc
            .all_logs(&admin, &PaginationParams::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }
}
