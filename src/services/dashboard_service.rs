use crate::entities::{MemberStatus, StaffRole, member_entity as member};
use crate::error::AppResult;
use crate::models::AdminStats;
use crate::services::{Credential, IdentityService, SubscriptionService};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

#[derive(Clone)]
pub struct DashboardService {
    pool: DatabaseConnection,
    identity: IdentityService,
    subscriptions: SubscriptionService,
}

impl DashboardService {
    pub fn new(
        pool: DatabaseConnection,
        identity: IdentityService,
        subscriptions: SubscriptionService,
    ) -> Self {
        Self {
            pool,
            identity,
            subscriptions,
        }
    }

    pub async fn admin_stats(&self, credential: &Credential) -> AppResult<AdminStats> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;

        let total_members = member::Entity::find().count(&self.pool).await?;
        let active_members = member::Entity::find()
            .filter(member::Column::Status.eq(MemberStatus::Active))
            .count(&self.pool)
            .await?;
        let total_revenue_cents = self.subscriptions.total_revenue_cents().await?;

        Ok(AdminStats {
            total_members,
            active_members,
            total_revenue_cents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::PayRequest;
    use crate::services::PlanService;
    use crate::test_support::TestContext;

    #[tokio::test]
    async fn test_admin_stats() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let plans = PlanService::new(ctx.db.clone());
        plans.seed_defaults().await.unwrap();
        let subs = SubscriptionService::new(ctx.db.clone(), ctx.identity.clone(), plans);
        let svc = DashboardService::new(ctx.db.clone(), ctx.identity.clone(), subs.clone());

        let (_, buyer) = ctx.member("buyer@gym.io", MemberStatus::Pending).await;
        let (_, applicant) = ctx.member("applicant@gym.io", MemberStatus::Pending).await;
        let paid = subs.apply(&buyer, "Gold").await.unwrap();
        subs.pay(
            &buyer,
            PayRequest {
                invoice_id: paid.invoice_id,
                amount_cents: 5900,
                payment_method: "card".to_string(),
                transaction_ref: Some("TX-1".to_string()),
            },
        )
        .await
        .unwrap();
        subs.apply(&applicant, "Silver").await.unwrap();

        let stats = svc.admin_stats(&admin).await.unwrap();
        assert_eq!(stats.total_members, 2);
        assert_eq!(stats.active_members, 1);
        assert_eq!(stats.total_revenue_cents, 5900);

        assert!(matches!(
            svc.admin_stats(&buyer).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
