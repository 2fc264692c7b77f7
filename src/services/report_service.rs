use crate::entities::{
    MemberStatus, StaffRole, TrainerStatus, attendance_log_entity as attendance,
    class_schedule_entity as schedule, member_entity as member, staff_entity as staff,
    trainer_entity as trainer,
};
use crate::error::AppResult;
use crate::models::*;
use crate::services::{Credential, IdentityService};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::collections::HashMap;

/// 多少天无入场记录视为流失风险
pub const CHURN_WINDOW_DAYS: i64 = 30;

/// 返回 (提成百分比, 得分)，得分 = 课程数 × 提成百分比
pub fn performance_score(classes_assigned: u64, commission_rate_bp: Option<i32>) -> (f64, f64) {
    let rate = f64::from(commission_rate_bp.unwrap_or(0)) / 100.0;
    (rate, rate * classes_assigned as f64)
}

#[derive(Clone)]
pub struct ReportService {
    pool: DatabaseConnection,
    identity: IdentityService,
}

impl ReportService {
    pub fn new(pool: DatabaseConnection, identity: IdentityService) -> Self {
        Self { pool, identity }
    }

    /// active 会员中最近 30 天没有入场记录的
    pub async fn churn_risk(&self, credential: &Credential) -> AppResult<Vec<ChurnRiskEntry>> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;

        let cutoff = Utc::now() - Duration::days(CHURN_WINDOW_DAYS);
        let members = member::Entity::find()
            .filter(member::Column::Status.eq(MemberStatus::Active))
            .order_by_asc(member::Column::Id)
            .all(&self.pool)
            .await?;

        // 每个会员最近一次入场，一次查询取回
        let check_ins: Vec<(i64, DateTime<Utc>)> = attendance::Entity::find()
            .select_only()
            .column(attendance::Column::MemberId)
            .column(attendance::Column::CheckIn)
            .into_tuple()
            .all(&self.pool)
            .await?;
        let mut last_seen: HashMap<i64, DateTime<Utc>> = HashMap::new();
        for (member_id, check_in) in check_ins {
            let entry = last_seen.entry(member_id).or_insert(check_in);
            if check_in > *entry {
                *entry = check_in;
            }
        }

        let at_risk = members
            .into_iter()
            .filter_map(|m| {
                let last = last_seen.get(&m.id).copied();
                if last.is_some_and(|ts| ts >= cutoff) {
                    return None;
                }
                Some(ChurnRiskEntry {
                    member_id: m.id,
                    first_name: m.first_name,
                    last_name: m.last_name,
                    email: m.email,
                    last_check_in: last,
                })
            })
            .collect();
        Ok(at_risk)
    }

    /// 已录用教练的排课数量与得分，得分高的在前
    pub async fn trainer_performance(
        &self,
        credential: &Credential,
    ) -> AppResult<Vec<TrainerPerformance>> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;

        let trainers = trainer::Entity::find()
            .filter(trainer::Column::Status.eq(TrainerStatus::Hired))
            .all(&self.pool)
            .await?;
        let staff_ids: Vec<i64> = trainers.iter().map(|t| t.staff_id).collect();
        let names: HashMap<i64, String> = staff::Entity::find()
            .filter(staff::Column::Id.is_in(staff_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.id, s.full_name()))
            .collect();

        let assigned: Vec<i64> = schedule::Entity::find()
            .select_only()
            .column(schedule::Column::TrainerId)
            .into_tuple()
            .all(&self.pool)
            .await?;
        let mut class_counts: HashMap<i64, u64> = HashMap::new();
        for trainer_id in assigned {
            *class_counts.entry(trainer_id).or_default() += 1;
        }

        let mut report: Vec<TrainerPerformance> = trainers
            .into_iter()
            .map(|t| {
                let classes = class_counts.get(&t.id).copied().unwrap_or(0);
                let (commission_rate, score) = performance_score(classes, t.commission_rate_bp);
                TrainerPerformance {
                    trainer_id: t.id,
                    name: names.get(&t.staff_id).cloned().unwrap_or_default(),
                    classes_assigned: classes,
                    commission_rate,
                    score,
                }
            })
            .collect();
        report.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.trainer_id.cmp(&b.trainer_id))
        });
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DayOfWeek;
    use crate::services::{ClassService, StaffService};
    use crate::test_support::TestContext;
    use chrono::NaiveTime;
    use sea_orm::{ActiveModelTrait, Set};

    #[test]
    fn test_performance_score() {
        assert_eq!(performance_score(4, Some(1500)), (15.0, 60.0));
        assert_eq!(performance_score(3, None), (0.0, 0.0));
        assert_eq!(performance_score(0, Some(2000)), (20.0, 0.0));
    }

    #[tokio::test]
    async fn test_churn_risk() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = ReportService::new(ctx.db.clone(), ctx.identity.clone());

        let (never, _) = ctx.member("never@gym.io", MemberStatus::Active).await;
        let (stale, _) = ctx.member("stale@gym.io", MemberStatus::Active).await;
        let (recent, _) = ctx.member("recent@gym.io", MemberStatus::Active).await;
        ctx.member("pending@gym.io", MemberStatus::Pending).await;

        for (member_id, days_ago) in [(stale.id, 45), (recent.id, 60), (recent.id, 3)] {
            let at = Utc::now() - Duration::days(days_ago);
            attendance::ActiveModel {
                member_id: Set(member_id),
                check_in: Set(at),
                check_out: Set(Some(at + Duration::hours(1))),
                ..Default::default()
            }
            .insert(&ctx.db)
            .await
            .unwrap();
        }

        let risk = svc.churn_risk(&admin).await.unwrap();
        let ids: Vec<_> = risk.iter().map(|r| r.member_id).collect();
        assert_eq!(ids, vec![never.id, stale.id]);
        assert!(risk[0].last_check_in.is_none());
        assert!(risk[1].last_check_in.is_some());
    }

    #[tokio::test]
    async fn test_trainer_performance() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let staff_svc = StaffService::new(ctx.db.clone(), ctx.identity.clone());
        let classes = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let svc = ReportService::new(ctx.db.clone(), ctx.identity.clone());

        let busy = ctx.trainer("busy@gym.io", TrainerStatus::Pending).await;
        let idle = ctx.trainer("idle@gym.io", TrainerStatus::Pending).await;
        ctx.trainer("applicant@gym.io", TrainerStatus::Pending).await;
        staff_svc
            .hire_trainer(&admin, busy.id, HireTrainerRequest { commission_rate_bp: Some(1000) })
            .await
            .unwrap();
        staff_svc
            .hire_trainer(&admin, idle.id, HireTrainerRequest { commission_rate_bp: Some(2500) })
            .await
            .unwrap();

        let room = ctx.room("A", 10).await;
        let slots = [
            (DayOfWeek::Monday, 9),
            (DayOfWeek::Tuesday, 9),
            (DayOfWeek::Monday, 11),
        ];
        for (day, hour) in slots {
            classes
                .create_schedule(
                    &admin,
                    CreateScheduleRequest {
                        trainer_id: busy.id,
                        room_id: room.id,
                        class_name: "Circuit".to_string(),
                        day_of_week: day,
                        start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                        end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
                    },
                )
                .await
                .unwrap();
        }

        let report = svc.trainer_performance(&admin).await.unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].trainer_id, busy.id);
        assert_eq!(report[0].classes_assigned, 3);
        assert_eq!(report[0].score, 30.0);
        assert_eq!(report[1].trainer_id, idle.id);
        assert_eq!(report[1].commission_rate, 25.0);
        assert_eq!(report[1].score, 0.0);
    }
}
