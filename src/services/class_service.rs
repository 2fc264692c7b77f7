use crate::entities::{
    AccountKind, BookingStatus, StaffRole, TrainerStatus, attendance_log_entity as attendance,
    class_booking_entity as booking, class_schedule_entity as schedule,
    facility_room_entity as room, trainer_entity as trainer,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{Credential, IdentityService};
use chrono::{NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 半开区间 [s1, e1) 与 [s2, e2) 是否重叠，首尾相接不算冲突
pub fn intervals_overlap(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && s2 < e1
}

/// 已确认人数达到房间容量后进入候补
pub fn decide_booking_status(confirmed: u64, capacity: i32) -> BookingStatus {
    if confirmed >= u64::try_from(capacity).unwrap_or(0) {
        BookingStatus::Waitlist
    } else {
        BookingStatus::Confirmed
    }
}

#[derive(Clone)]
pub struct ClassService {
    pool: DatabaseConnection,
    identity: IdentityService,
    require_hired_trainer: bool,
}

impl ClassService {
    pub fn new(
        pool: DatabaseConnection,
        identity: IdentityService,
        require_hired_trainer: bool,
    ) -> Self {
        Self {
            pool,
            identity,
            require_hired_trainer,
        }
    }

    pub async fn create_schedule(
        &self,
        credential: &Credential,
        request: CreateScheduleRequest,
    ) -> AppResult<ScheduleResponse> {
        self.identity
            .require_staff_role(credential, StaffRole::Admin)
            .await?;

        let class_name = request.class_name.trim();
        if class_name.is_empty() {
            return Err(AppError::ValidationError("Class name is required".to_string()));
        }
        if request.start_time >= request.end_time {
            return Err(AppError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }

        room::Entity::find_by_id(request.room_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;
        let t = trainer::Entity::find_by_id(request.trainer_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Trainer not found".to_string()))?;
        if t.status != TrainerStatus::Hired {
            if self.require_hired_trainer {
                return Err(AppError::Forbidden(format!(
                    "Trainer {} is {}, only hired trainers can be scheduled",
                    t.id, t.status
                )));
            }
            log::warn!("Scheduling trainer {} whose status is {}", t.id, t.status);
        }

        let room_slots = schedule::Entity::find()
            .filter(schedule::Column::RoomId.eq(request.room_id))
            .filter(schedule::Column::DayOfWeek.eq(request.day_of_week))
            .all(&self.pool)
            .await?;
        if room_slots.iter().any(|s| {
            intervals_overlap(request.start_time, request.end_time, s.start_time, s.end_time)
        }) {
            return Err(AppError::Conflict("Room is already booked for this time.".to_string()));
        }

        let trainer_slots = schedule::Entity::find()
            .filter(schedule::Column::TrainerId.eq(request.trainer_id))
            .filter(schedule::Column::DayOfWeek.eq(request.day_of_week))
            .all(&self.pool)
            .await?;
        if trainer_slots.iter().any(|s| {
            intervals_overlap(request.start_time, request.end_time, s.start_time, s.end_time)
        }) {
            return Err(AppError::Conflict(
                "Trainer is already assigned to a class at this time.".to_string(),
            ));
        }

        let created = schedule::ActiveModel {
            trainer_id: Set(request.trainer_id),
            room_id: Set(request.room_id),
            class_name: Set(class_name.to_string()),
            day_of_week: Set(request.day_of_week),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Scheduled class {} '{}' on {} {}-{}",
            created.id,
            created.class_name,
            created.day_of_week,
            created.start_time,
            created.end_time
        );
        Ok(ScheduleResponse::from(created))
    }

    /// 按星期、开始时间排序
    pub async fn list_schedules(&self) -> AppResult<Vec<ScheduleResponse>> {
        let mut all = schedule::Entity::find().all(&self.pool).await?;
        all.sort_by_key(|s| (s.day_of_week, s.start_time, s.id));
        Ok(all.into_iter().map(ScheduleResponse::from).collect())
    }

    pub async fn book(
        &self,
        credential: &Credential,
        schedule_id: i64,
    ) -> AppResult<BookingResponse> {
        let m = self.identity.require_member(credential).await?;

        let txn = self.pool.begin().await?;
        let s = schedule::Entity::find_by_id(schedule_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Class schedule not found".to_string()))?;

        let existing = booking::Entity::find()
            .filter(booking::Column::MemberId.eq(m.id))
            .filter(booking::Column::ScheduleId.eq(s.id))
            .filter(booking::Column::Status.ne(BookingStatus::Cancelled))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("You have already booked this class".to_string()));
        }

        let r = room::Entity::find_by_id(s.room_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;
        let confirmed = booking::Entity::find()
            .filter(booking::Column::ScheduleId.eq(s.id))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
            .count(&txn)
            .await?;
        let status = decide_booking_status(confirmed, r.capacity);

        let created = booking::ActiveModel {
            member_id: Set(m.id),
            schedule_id: Set(s.id),
            booked_at: Set(Utc::now()),
            status: Set(status),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "You have already booked this class"))?;
        txn.commit().await?;

        log::info!(
            "Member {} booked schedule {} as {} ({}/{} confirmed)",
            m.id,
            s.id,
            status,
            confirmed,
            r.capacity
        );
        Ok(BookingResponse::from(created))
    }

    /// 软删除，已取消的再次取消直接返回
    pub async fn cancel_booking(
        &self,
        credential: &Credential,
        booking_id: i64,
    ) -> AppResult<BookingResponse> {
        let m = self.identity.require_member(credential).await?;
        let b = booking::Entity::find_by_id(booking_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        if b.member_id != m.id {
            return Err(AppError::Forbidden("Booking belongs to another member".to_string()));
        }
        if b.status == BookingStatus::Cancelled {
            return Ok(BookingResponse::from(b));
        }

        let mut am = b.into_active_model();
        am.status = Set(BookingStatus::Cancelled);
        let b = am.update(&self.pool).await?;
        log::info!("Member {} cancelled booking {}", m.id, b.id);
        Ok(BookingResponse::from(b))
    }

    pub async fn my_bookings(&self, credential: &Credential) -> AppResult<Vec<BookingResponse>> {
        let m = self.identity.require_member(credential).await?;
        let list = booking::Entity::find()
            .filter(booking::Column::MemberId.eq(m.id))
            .order_by_desc(booking::Column::BookedAt)
            .order_by_desc(booking::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(BookingResponse::from).collect())
    }

    /// 员工为预约会员登记到场，预约状态不变
    pub async fn mark_attendance(
        &self,
        credential: &Credential,
        booking_id: i64,
    ) -> AppResult<AttendanceLogResponse> {
        self.identity
            .require_role(credential, AccountKind::Staff)
            .await?;

        let b = booking::Entity::find_by_id(booking_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        if b.status == BookingStatus::Cancelled {
            return Err(AppError::ValidationError(
                "Cannot mark attendance for a cancelled booking".to_string(),
            ));
        }

        let open = attendance::Entity::find()
            .filter(attendance::Column::MemberId.eq(b.member_id))
            .filter(attendance::Column::CheckOut.is_null())
            .one(&self.pool)
            .await?;
        if open.is_some() {
            return Err(AppError::Conflict("Member is already checked in".to_string()));
        }

        let log_row = attendance::ActiveModel {
            member_id: Set(b.member_id),
            check_in: Set(Utc::now()),
            check_out: Set(None),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Member is already checked in"))?;

        log::info!("Attendance marked for booking {} (member {})", b.id, b.member_id);
        Ok(AttendanceLogResponse::from(log_row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DayOfWeek, MemberStatus};
    use crate::test_support::TestContext;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn request(
        trainer_id: i64,
        room_id: i64,
        day: DayOfWeek,
        start: NaiveTime,
        end: NaiveTime,
    ) -> CreateScheduleRequest {
        CreateScheduleRequest {
            trainer_id,
            room_id,
            class_name: "Spin".to_string(),
            day_of_week: day,
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn test_intervals_overlap() {
        assert!(intervals_overlap(t(9, 0), t(10, 0), t(9, 30), t(10, 30)));
        assert!(!intervals_overlap(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(!intervals_overlap(t(10, 0), t(11, 0), t(9, 0), t(10, 0)));
        // 完全包含
        assert!(intervals_overlap(t(8, 0), t(12, 0), t(9, 0), t(10, 0)));
        assert!(intervals_overlap(t(9, 15), t(9, 45), t(9, 0), t(10, 0)));
    }

    #[test]
    fn test_decide_booking_status() {
        assert_eq!(decide_booking_status(0, 2), BookingStatus::Confirmed);
        assert_eq!(decide_booking_status(1, 2), BookingStatus::Confirmed);
        assert_eq!(decide_booking_status(2, 2), BookingStatus::Waitlist);
        assert_eq!(decide_booking_status(5, 2), BookingStatus::Waitlist);
    }

    #[tokio::test]
    async fn test_room_and_trainer_conflicts() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let coach = ctx.trainer("coach@gym.io", TrainerStatus::Hired).await;
        let other = ctx.trainer("other@gym.io", TrainerStatus::Hired).await;
        let room_a = ctx.room("A", 10).await;
        let room_b = ctx.room("B", 10).await;

        let first = request(coach.id, room_a.id, DayOfWeek::Monday, t(9, 0), t(10, 0));
        svc.create_schedule(&admin, first).await.unwrap();

        // 同房间重叠
        let same_room = request(other.id, room_a.id, DayOfWeek::Monday, t(9, 30), t(10, 30));
        let room_clash = svc.create_schedule(&admin, same_room).await;
        assert!(matches!(room_clash, Err(AppError::Conflict(m)) if m.starts_with("Room")));

        // 同教练重叠
        let same_coach = request(coach.id, room_b.id, DayOfWeek::Monday, t(8, 0), t(12, 0));
        let trainer_clash = svc.create_schedule(&admin, same_coach).await;
        assert!(matches!(trainer_clash, Err(AppError::Conflict(m)) if m.starts_with("Trainer")));

        // 首尾相接、不同天都可以
        let adjacent = request(coach.id, room_a.id, DayOfWeek::Monday, t(10, 0), t(11, 0));
        svc.create_schedule(&admin, adjacent).await.unwrap();
        let next_day = request(coach.id, room_a.id, DayOfWeek::Tuesday, t(9, 30), t(10, 30));
        svc.create_schedule(&admin, next_day).await.unwrap();

        let listed = svc.list_schedules().await.unwrap();
        let order: Vec<_> = listed.iter().map(|s| (s.day_of_week, s.start_time)).collect();
        assert_eq!(
            order,
            vec![
                (DayOfWeek::Monday, t(9, 0)),
                (DayOfWeek::Monday, t(10, 0)),
                (DayOfWeek::Tuesday, t(9, 30)),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_schedule_validation_and_gate() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let (_, desk) = ctx.staff("desk@gym.io", StaffRole::Frontdesk).await;
        let coach = ctx.trainer("coach@gym.io", TrainerStatus::Pending).await;
        let room_a = ctx.room("A", 10).await;

        let svc = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let friday = |room_id: i64, start: NaiveTime, end: NaiveTime| {
            request(coach.id, room_id, DayOfWeek::Friday, start, end)
        };
        assert!(matches!(
            svc.create_schedule(&desk, friday(room_a.id, t(9, 0), t(10, 0))).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            svc.create_schedule(&admin, friday(room_a.id, t(10, 0), t(10, 0))).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            svc.create_schedule(&admin, friday(999, t(9, 0), t(10, 0))).await,
            Err(AppError::NotFound(_))
        ));
        // pending 教练默认允许排课
        assert!(
            svc.create_schedule(&admin, friday(room_a.id, t(9, 0), t(10, 0)))
                .await
                .is_ok()
        );

        let strict = ClassService::new(ctx.db.clone(), ctx.identity.clone(), true);
        let saturday = request(coach.id, room_a.id, DayOfWeek::Saturday, t(9, 0), t(10, 0));
        assert!(matches!(
            strict.create_schedule(&admin, saturday).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_booking_capacity_and_waitlist() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let coach = ctx.trainer("coach@gym.io", TrainerStatus::Hired).await;
        let small = ctx.room("Small", 2).await;
        let evening = request(coach.id, small.id, DayOfWeek::Wednesday, t(18, 0), t(19, 0));
        let sched = svc.create_schedule(&admin, evening).await.unwrap();

        let mut statuses = Vec::new();
        for i in 0..3 {
            let (_, cred) = ctx.member(&format!("m{i}@gym.io"), MemberStatus::Active).await;
            statuses.push(svc.book(&cred, sched.id).await.unwrap().status);
        }
        assert_eq!(
            statuses,
            vec![BookingStatus::Confirmed, BookingStatus::Confirmed, BookingStatus::Waitlist]
        );
    }

    #[tokio::test]
    async fn test_duplicate_booking_and_cancel() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let coach = ctx.trainer("coach@gym.io", TrainerStatus::Hired).await;
        let room_a = ctx.room("A", 5).await;
        let morning = request(coach.id, room_a.id, DayOfWeek::Sunday, t(7, 0), t(8, 0));
        let sched = svc.create_schedule(&admin, morning).await.unwrap();
        let (_, cred) = ctx.member("dup@gym.io", MemberStatus::Pending).await;
        let (_, other) = ctx.member("other@gym.io", MemberStatus::Pending).await;

        let first = svc.book(&cred, sched.id).await.unwrap();
        assert!(matches!(svc.book(&cred, sched.id).await, Err(AppError::Conflict(_))));
        assert!(matches!(svc.book(&cred, 999).await, Err(AppError::NotFound(_))));

        assert!(matches!(
            svc.cancel_booking(&other, first.id).await,
            Err(AppError::Forbidden(_))
        ));
        let cancelled = svc.cancel_booking(&cred, first.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        // 重复取消无副作用
        assert_eq!(
            svc.cancel_booking(&cred, first.id).await.unwrap().status,
            BookingStatus::Cancelled
        );

        // 取消后可以重新预约
        svc.book(&cred, sched.id).await.unwrap();
        assert_eq!(svc.my_bookings(&cred).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_one_live_booking_enforced_by_index() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let svc = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let coach = ctx.trainer("coach@gym.io", TrainerStatus::Hired).await;
        let room_a = ctx.room("A", 5).await;
        let noon = request(coach.id, room_a.id, DayOfWeek::Monday, t(12, 0), t(13, 0));
        let sched = svc.create_schedule(&admin, noon).await.unwrap();
        let (m, cred) = ctx.member("idx@gym.io", MemberStatus::Active).await;
        let first = svc.book(&cred, sched.id).await.unwrap();

        let row = |status: BookingStatus| booking::ActiveModel {
            member_id: Set(m.id),
            schedule_id: Set(sched.id),
            booked_at: Set(Utc::now()),
            status: Set(status),
            ..Default::default()
        };

        // 绕过 book 的预检查直接写库
        for status in [BookingStatus::Confirmed, BookingStatus::Waitlist] {
            let err = row(status)
                .insert(&ctx.db)
                .await
                .map_err(|e| AppError::on_unique_violation(e, "Duplicate booking"))
                .unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }

        // 已取消的预约可以共存
        row(BookingStatus::Cancelled).insert(&ctx.db).await.unwrap();
        svc.cancel_booking(&cred, first.id).await.unwrap();
        row(BookingStatus::Confirmed).insert(&ctx.db).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_attendance() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let (_, desk) = ctx.staff("desk@gym.io", StaffRole::Frontdesk).await;
        let svc = ClassService::new(ctx.db.clone(), ctx.identity.clone(), false);
        let coach = ctx.trainer("coach@gym.io", TrainerStatus::Hired).await;
        let room_a = ctx.room("A", 5).await;
        let morning = request(coach.id, room_a.id, DayOfWeek::Thursday, t(7, 0), t(8, 0));
        let sched = svc.create_schedule(&admin, morning).await.unwrap();
        let (_, cred) = ctx.member("att@gym.io", MemberStatus::Active).await;
        let b = svc.book(&cred, sched.id).await.unwrap();

        // 会员不能自己登记
        assert!(matches!(
            svc.mark_attendance(&cred, b.id).await,
            Err(AppError::Forbidden(_))
        ));

        let log_row = svc.mark_attendance(&desk, b.id).await.unwrap();
        assert_eq!(log_row.member_id, b.member_id);
        assert!(log_row.check_out.is_none());
        assert!(matches!(
            svc.mark_attendance(&desk, b.id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            svc.mark_attendance(&desk, 12345).await,
            Err(AppError::NotFound(_))
        ));
    }
}
