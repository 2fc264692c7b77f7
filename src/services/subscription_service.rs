use crate::entities::{
    InvoiceStatus, MemberStatus, SubscriptionStatus, invoice_entity as invoice,
    member_entity as member, membership_plan_entity as plan, payment_entity as payment,
    subscription_entity as subscription,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{Credential, IdentityService, PlanService};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

/// 发票自创建起 7 天内到期
pub const INVOICE_DUE_DAYS: i64 = 7;

/// 不支持部分付款，也不记余额
pub fn ensure_sufficient(amount_paid_cents: i64, amount_due_cents: i64) -> AppResult<()> {
    if amount_paid_cents < amount_due_cents {
        return Err(AppError::Conflict("Insufficient funds".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
    identity: IdentityService,
    plans: PlanService,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection, identity: IdentityService, plans: PlanService) -> Self {
        Self {
            pool,
            identity,
            plans,
        }
    }

    pub async fn apply(
        &self,
        credential: &Credential,
        plan_name: &str,
    ) -> AppResult<ApplyResponse> {
        let m = self.identity.require_member(credential).await?;
        let p = self
            .plans
            .find_by_name(plan_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Plan '{}' not found", plan_name.trim())))?;

        let today = Utc::now().date_naive();
        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let open = subscription::Entity::find()
            .filter(subscription::Column::MemberId.eq(m.id))
            .filter(
                subscription::Column::Status
                    .is_in([SubscriptionStatus::Pending, SubscriptionStatus::Active]),
            )
            .all(&txn)
            .await?;
        for s in open {
            if s.blocks_new_application(today) {
                log::warn!(
                    "Member {} already has subscription {} ({})",
                    m.id,
                    s.id,
                    s.status
                );
                return Err(AppError::Conflict(
                    "Member already has an active or pending subscription".to_string(),
                ));
            }
            // 已过结束日期的 active 订阅先落库为 expired
            let id = s.id;
            let mut am = s.into_active_model();
            am.status = Set(SubscriptionStatus::Expired);
            am.updated_at = Set(now);
            am.update(&txn).await?;
            log::info!("Subscription {id} expired");
        }

        let sub = subscription::ActiveModel {
            member_id: Set(m.id),
            plan_id: Set(p.id),
            start_date: Set(today),
            end_date: Set(today + Duration::days(i64::from(p.duration_days))),
            status: Set(SubscriptionStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(e, "Member already has an active or pending subscription")
        })?;

        let inv = invoice::ActiveModel {
            subscription_id: Set(sub.id),
            amount_cents: Set(p.discounted_fee_cents),
            due_date: Set(today + Duration::days(INVOICE_DUE_DAYS)),
            status: Set(InvoiceStatus::Pending),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut member_am = m.into_active_model();
        member_am.current_subscription_id = Set(Some(sub.id));
        member_am.updated_at = Set(now);
        let m = member_am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Member {} applied for plan {} (subscription {}, invoice {} for {} cents)",
            m.id,
            p.name,
            sub.id,
            inv.id,
            inv.amount_cents
        );
        Ok(ApplyResponse {
            subscription_id: sub.id,
            invoice_id: inv.id,
            amount_cents: inv.amount_cents,
            due_date: inv.due_date,
            status: inv.status,
        })
    }

    /// 唯一能把订阅激活的路径
    pub async fn pay(
        &self,
        credential: &Credential,
        request: PayRequest,
    ) -> AppResult<PaymentResponse> {
        let m = self.identity.require_member(credential).await?;
        if request.amount_cents <= 0 {
            return Err(AppError::ValidationError("Amount must be positive".to_string()));
        }
        if request.payment_method.trim().is_empty() {
            return Err(AppError::ValidationError("Payment method is required".to_string()));
        }

        let today = Utc::now().date_naive();
        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let inv = invoice::Entity::find_by_id(request.invoice_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))?;
        let sub = subscription::Entity::find_by_id(inv.subscription_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!("Invoice {} has no subscription", inv.id))
            })?;

        if sub.member_id != m.id {
            return Err(AppError::Forbidden("Invoice belongs to another member".to_string()));
        }
        if inv.status == InvoiceStatus::Paid {
            return Err(AppError::Conflict("Invoice already paid".to_string()));
        }
        if sub.status != SubscriptionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Subscription is {}, invoice can no longer be paid",
                sub.status
            )));
        }
        if let Err(e) = ensure_sufficient(request.amount_cents, inv.amount_cents) {
            log::warn!(
                "Insufficient payment for invoice {}: {} < {}",
                inv.id,
                request.amount_cents,
                inv.amount_cents
            );
            return Err(e);
        }

        let transaction_ref = request
            .transaction_ref
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let pay = payment::ActiveModel {
            invoice_id: Set(inv.id),
            payment_date: Set(today),
            amount_paid_cents: Set(request.amount_cents),
            payment_method: Set(request.payment_method.trim().to_string()),
            transaction_ref: Set(transaction_ref),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Invoice already paid"))?;

        let mut inv_am = inv.into_active_model();
        inv_am.status = Set(InvoiceStatus::Paid);
        let inv = inv_am.update(&txn).await?;

        let mut sub_am = sub.into_active_model();
        sub_am.status = Set(SubscriptionStatus::Active);
        sub_am.updated_at = Set(now);
        let sub = sub_am.update(&txn).await?;

        let m = member::Entity::find_by_id(m.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        if m.status != MemberStatus::Banned && m.status != MemberStatus::Active {
            let mut member_am = m.into_active_model();
            member_am.status = Set(MemberStatus::Active);
            member_am.updated_at = Set(now);
            member_am.update(&txn).await?;
        }

        txn.commit().await?;

        log::info!(
            "Invoice {} paid ({} cents), subscription {} active",
            inv.id,
            pay.amount_paid_cents,
            sub.id
        );
        Ok(PaymentResponse {
            payment_id: pay.id,
            invoice_id: inv.id,
            amount_paid_cents: pay.amount_paid_cents,
            transaction_ref: pay.transaction_ref,
            invoice_status: inv.status,
            subscription_status: sub.status,
        })
    }

    pub async fn cancel(&self, credential: &Credential) -> AppResult<SubscriptionView> {
        let m = self.identity.require_member(credential).await?;
        let today = Utc::now().date_naive();

        let open = subscription::Entity::find()
            .filter(subscription::Column::MemberId.eq(m.id))
            .filter(
                subscription::Column::Status
                    .is_in([SubscriptionStatus::Pending, SubscriptionStatus::Active]),
            )
            .order_by_desc(subscription::Column::Id)
            .all(&self.pool)
            .await?;
        let sub = open
            .into_iter()
            .find(|s| s.blocks_new_application(today))
            .ok_or_else(|| {
                AppError::NotFound("No active or pending subscription to cancel".to_string())
            })?;

        let mut am = sub.into_active_model();
        am.status = Set(SubscriptionStatus::Canceled);
        am.updated_at = Set(Utc::now());
        let sub = am.update(&self.pool).await?;

        log::info!("Member {} canceled subscription {}", m.id, sub.id);
        let plans = self.plan_names().await?;
        Ok(view(sub, &plans, today))
    }

    pub async fn current(&self, credential: &Credential) -> AppResult<CurrentSubscriptionResponse> {
        let m = self.identity.require_member(credential).await?;
        let Some(sub_id) = m.current_subscription_id else {
            return Ok(CurrentSubscriptionResponse {
                has_subscription: false,
                subscription: None,
            });
        };

        let sub = subscription::Entity::find_by_id(sub_id).one(&self.pool).await?;
        let Some(sub) = sub else {
            return Ok(CurrentSubscriptionResponse {
                has_subscription: false,
                subscription: None,
            });
        };

        let plans = self.plan_names().await?;
        Ok(CurrentSubscriptionResponse {
            has_subscription: true,
            subscription: Some(view(sub, &plans, Utc::now().date_naive())),
        })
    }

    /// 会员全部订阅，新的在前
    pub async fn history(&self, credential: &Credential) -> AppResult<Vec<SubscriptionView>> {
        let m = self.identity.require_member(credential).await?;
        let subs = subscription::Entity::find()
            .filter(subscription::Column::MemberId.eq(m.id))
            .order_by_desc(subscription::Column::CreatedAt)
            .order_by_desc(subscription::Column::Id)
            .all(&self.pool)
            .await?;

        let plans = self.plan_names().await?;
        let today = Utc::now().date_naive();
        Ok(subs.into_iter().map(|s| view(s, &plans, today)).collect())
    }

    /// 最早到期的未付发票 (仅限仍为 pending 的订阅)
    pub async fn pending_invoice(
        &self,
        credential: &Credential,
    ) -> AppResult<Option<InvoiceResponse>> {
        let m = self.identity.require_member(credential).await?;
        let sub_ids: Vec<i64> = subscription::Entity::find()
            .select_only()
            .column(subscription::Column::Id)
            .filter(subscription::Column::MemberId.eq(m.id))
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Pending))
            .into_tuple()
            .all(&self.pool)
            .await?;
        if sub_ids.is_empty() {
            return Ok(None);
        }

        let inv = invoice::Entity::find()
            .filter(invoice::Column::SubscriptionId.is_in(sub_ids))
            .filter(invoice::Column::Status.ne(InvoiceStatus::Paid))
            .order_by_asc(invoice::Column::DueDate)
            .one(&self.pool)
            .await?;
        let today = Utc::now().date_naive();
        Ok(inv.map(|i| InvoiceResponse::from_model(i, today)))
    }

    /// 已付发票金额合计 (美分)
    pub async fn total_revenue_cents(&self) -> AppResult<i64> {
        let amounts: Vec<i64> = invoice::Entity::find()
            .select_only()
            .column(invoice::Column::AmountCents)
            .filter(invoice::Column::Status.eq(InvoiceStatus::Paid))
            .into_tuple()
            .all(&self.pool)
            .await?;
        Ok(amounts.into_iter().sum())
    }

    async fn plan_names(&self) -> AppResult<HashMap<i64, String>> {
        let plans = plan::Entity::find().all(&self.pool).await?;
        Ok(plans.into_iter().map(|p| (p.id, p.name)).collect())
    }
}

fn view(
    s: subscription::Model,
    plans: &HashMap<i64, String>,
    today: NaiveDate,
) -> SubscriptionView {
    let status = s.effective_status(today);
    SubscriptionView {
        subscription_id: s.id,
        plan_name: plans.get(&s.plan_id).cloned().unwrap_or_default(),
        start_date: s.start_date,
        end_date: s.end_date,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;

    async fn setup() -> (TestContext, SubscriptionService) {
        let ctx = TestContext::new().await;
        let plans = PlanService::new(ctx.db.clone());
        plans.seed_defaults().await.unwrap();
        let svc = SubscriptionService::new(ctx.db.clone(), ctx.identity.clone(), plans);
        (ctx, svc)
    }

    fn pay_request(invoice_id: i64, amount_cents: i64) -> PayRequest {
        PayRequest {
            invoice_id,
            amount_cents,
            payment_method: "card".to_string(),
            transaction_ref: None,
        }
    }

    #[test]
    fn test_ensure_sufficient() {
        assert!(ensure_sufficient(5900, 5900).is_ok());
        assert!(ensure_sufficient(6000, 5900).is_ok());
        assert!(matches!(
            ensure_sufficient(5899, 5900),
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_gold_apply_and_pay() {
        let (ctx, svc) = setup().await;
        let (m, cred) = ctx.member("gold@gym.io", MemberStatus::Pending).await;
        let today = Utc::now().date_naive();

        let applied = svc.apply(&cred, "gold").await.unwrap();
        assert_eq!(applied.amount_cents, 5900);
        assert_eq!(applied.due_date, today + Duration::days(7));
        assert_eq!(applied.status, InvoiceStatus::Pending);

        let refreshed = member::Entity::find_by_id(m.id).one(&ctx.db).await.unwrap().unwrap();
        assert_eq!(refreshed.current_subscription_id, Some(applied.subscription_id));

        let paid = svc.pay(&cred, pay_request(applied.invoice_id, 5900)).await.unwrap();
        assert_eq!(paid.invoice_status, InvoiceStatus::Paid);
        assert_eq!(paid.subscription_status, SubscriptionStatus::Active);
        assert!(!paid.transaction_ref.is_empty());

        let current = svc.current(&cred).await.unwrap().subscription.unwrap();
        assert_eq!(current.plan_name, "Gold");
        assert_eq!(current.status, SubscriptionStatus::Active);
        assert_eq!(current.end_date, current.start_date + Duration::days(90));

        let refreshed = member::Entity::find_by_id(m.id).one(&ctx.db).await.unwrap().unwrap();
        assert_eq!(refreshed.status, MemberStatus::Active);

        assert_eq!(svc.total_revenue_cents().await.unwrap(), 5900);
    }

    #[tokio::test]
    async fn test_unknown_plan_not_found() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("x@gym.io", MemberStatus::Pending).await;
        assert!(matches!(
            svc.apply(&cred, "Diamond").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_second_apply_conflicts_until_cancel() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("twice@gym.io", MemberStatus::Pending).await;

        svc.apply(&cred, "Silver").await.unwrap();
        assert!(matches!(
            svc.apply(&cred, "Gold").await,
            Err(AppError::Conflict(_))
        ));

        let canceled = svc.cancel(&cred).await.unwrap();
        assert_eq!(canceled.status, SubscriptionStatus::Canceled);

        let again = svc.apply(&cred, "Gold").await.unwrap();
        assert_eq!(again.amount_cents, 5900);
        assert_eq!(svc.history(&cred).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_one_open_subscription_enforced_by_index() {
        let (ctx, svc) = setup().await;
        let (m, cred) = ctx.member("race@gym.io", MemberStatus::Pending).await;
        let applied = svc.apply(&cred, "Gold").await.unwrap();
        let today = Utc::now().date_naive();

        let row = |status: SubscriptionStatus| subscription::ActiveModel {
            member_id: Set(m.id),
            plan_id: Set(1),
            start_date: Set(today),
            end_date: Set(today + Duration::days(30)),
            status: Set(status),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        // 绕过 apply 的预检查直接写库
        for status in [SubscriptionStatus::Pending, SubscriptionStatus::Active] {
            let err = row(status)
                .insert(&ctx.db)
                .await
                .map_err(|e| AppError::on_unique_violation(e, "Duplicate subscription"))
                .unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }

        // 已结束的订阅不占名额
        row(SubscriptionStatus::Canceled).insert(&ctx.db).await.unwrap();
        row(SubscriptionStatus::Expired).insert(&ctx.db).await.unwrap();
        assert_eq!(
            svc.pending_invoice(&cred).await.unwrap().unwrap().id,
            applied.invoice_id
        );
    }

    #[tokio::test]
    async fn test_active_subscription_blocks_apply() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("act@gym.io", MemberStatus::Active).await;

        let applied = svc.apply(&cred, "Silver").await.unwrap();
        svc.pay(&cred, pay_request(applied.invoice_id, 2900)).await.unwrap();
        assert!(matches!(
            svc.apply(&cred, "Platinum").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_lapsed_active_subscription_expires_on_apply() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("old@gym.io", MemberStatus::Active).await;

        let applied = svc.apply(&cred, "Silver").await.unwrap();
        svc.pay(&cred, pay_request(applied.invoice_id, 2900)).await.unwrap();

        // 把结束日期挪到过去
        let sub = subscription::Entity::find_by_id(applied.subscription_id)
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        let mut am = sub.into_active_model();
        am.start_date = Set(Utc::now().date_naive() - Duration::days(40));
        am.end_date = Set(Utc::now().date_naive() - Duration::days(10));
        am.update(&ctx.db).await.unwrap();

        let current = svc.current(&cred).await.unwrap().subscription.unwrap();
        assert_eq!(current.status, SubscriptionStatus::Expired);

        svc.apply(&cred, "Gold").await.unwrap();
        let old = subscription::Entity::find_by_id(applied.subscription_id)
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(old.status, SubscriptionStatus::Expired);
    }

    #[tokio::test]
    async fn test_insufficient_payment_leaves_state() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("short@gym.io", MemberStatus::Pending).await;
        let applied = svc.apply(&cred, "Gold").await.unwrap();

        let result = svc.pay(&cred, pay_request(applied.invoice_id, 5000)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let inv = invoice::Entity::find_by_id(applied.invoice_id)
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inv.status, InvoiceStatus::Pending);
        let sub = subscription::Entity::find_by_id(applied.subscription_id)
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert_eq!(svc.total_revenue_cents().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_double_payment_conflicts() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("dbl@gym.io", MemberStatus::Pending).await;
        let applied = svc.apply(&cred, "Silver").await.unwrap();

        svc.pay(&cred, pay_request(applied.invoice_id, 2900)).await.unwrap();
        let second = svc.pay(&cred, pay_request(applied.invoice_id, 2900)).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(svc.total_revenue_cents().await.unwrap(), 2900);
    }

    #[tokio::test]
    async fn test_pay_foreign_invoice_forbidden() {
        let (ctx, svc) = setup().await;
        let (_, owner) = ctx.member("owner@gym.io", MemberStatus::Pending).await;
        let (_, other) = ctx.member("other@gym.io", MemberStatus::Pending).await;
        let applied = svc.apply(&owner, "Silver").await.unwrap();

        assert!(matches!(
            svc.pay(&other, pay_request(applied.invoice_id, 2900)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            svc.pay(&other, pay_request(9999, 2900)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_canceled_subscription_invoice_unpayable() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("c@gym.io", MemberStatus::Pending).await;
        let applied = svc.apply(&cred, "Silver").await.unwrap();
        assert!(svc.pending_invoice(&cred).await.unwrap().is_some());

        svc.cancel(&cred).await.unwrap();
        assert!(svc.pending_invoice(&cred).await.unwrap().is_none());
        assert!(matches!(
            svc.pay(&cred, pay_request(applied.invoice_id, 2900)).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(svc.cancel(&cred).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_pending_invoice_and_current_none() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("n@gym.io", MemberStatus::Pending).await;

        let current = svc.current(&cred).await.unwrap();
        assert!(!current.has_subscription);
        assert!(svc.pending_invoice(&cred).await.unwrap().is_none());

        let applied = svc.apply(&cred, "Platinum").await.unwrap();
        let inv = svc.pending_invoice(&cred).await.unwrap().unwrap();
        assert_eq!(inv.id, applied.invoice_id);
        assert_eq!(inv.amount_cents, 9900);
        assert_eq!(inv.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_overdue_reported_lazily() {
        let (ctx, svc) = setup().await;
        let (_, cred) = ctx.member("late@gym.io", MemberStatus::Pending).await;
        let applied = svc.apply(&cred, "Silver").await.unwrap();

        let inv = invoice::Entity::find_by_id(applied.invoice_id)
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        let mut am = inv.into_active_model();
        am.due_date = Set(Utc::now().date_naive() - Duration::days(1));
        am.update(&ctx.db).await.unwrap();

        let inv = svc.pending_invoice(&cred).await.unwrap().unwrap();
        assert_eq!(inv.status, InvoiceStatus::Overdue);
    }
}
