use crate::entities::membership_plan_entity as plan;
use crate::error::AppResult;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
    TransactionTrait,
};

/// (name, duration_days, base_fee_cents, discounted_fee_cents)
const DEFAULT_PLANS: [(&str, i32, i64, i64); 3] = [
    ("Silver", 30, 3500, 2900),
    ("Gold", 90, 7500, 5900),
    ("Platinum", 365, 15000, 9900),
];

pub fn normalize_plan_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Clone)]
pub struct PlanService {
    pool: DatabaseConnection,
}

impl PlanService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<plan::Model>> {
        let plans = plan::Entity::find()
            .order_by_asc(plan::Column::DurationDays)
            .all(&self.pool)
            .await?;
        Ok(plans)
    }

    /// 按名称查找，大小写不敏感。两边都在 Rust 里归一化，
    /// 不依赖数据库 LOWER() 对非 ASCII 字符的处理
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<plan::Model>> {
        let wanted = normalize_plan_name(name);
        let found = self
            .list()
            .await?
            .into_iter()
            .find(|p| normalize_plan_name(&p.name) == wanted);
        Ok(found)
    }

    /// 表为空时写入默认套餐，返回写入条数
    pub async fn seed_defaults(&self) -> AppResult<u64> {
        if plan::Entity::find().count(&self.pool).await? > 0 {
            return Ok(0);
        }

        let txn = self.pool.begin().await?;
        for (name, duration_days, base, discounted) in DEFAULT_PLANS {
            plan::ActiveModel {
                name: Set(name.to_string()),
                duration_days: Set(duration_days),
                base_fee_cents: Set(base),
                discounted_fee_cents: Set(discounted),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        log::info!("Seeded {} membership plans", DEFAULT_PLANS.len());
        Ok(DEFAULT_PLANS.len() as u64)
    }
}
