use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum FacilityRooms {
    Table,
    Id,
    Name,
    Capacity,
    RoomType,
}

/// Recurring weekly class slot
#[derive(DeriveIden)]
enum ClassSchedules {
    Table,
    Id,
    TrainerId,
    RoomId,
    ClassName,
    DayOfWeek,
    StartTime,
    EndTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClassBookings {
    Table,
    Id,
    MemberId,
    ScheduleId,
    BookedAt,
    Status,
}

#[derive(DeriveIden)]
enum AttendanceLogs {
    Table,
    Id,
    MemberId,
    CheckIn,
    CheckOut,
}

#[derive(DeriveIden)]
enum Trainers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// - 同一会员对同一课程最多一条未取消的预约
/// - 同一会员最多一条未签出的到场记录
const PARTIAL_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_class_bookings_member_schedule_open ON class_bookings (member_id, schedule_id) WHERE status <> 'cancelled'",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_logs_member_open ON attendance_logs (member_id) WHERE check_out IS NULL",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FacilityRooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FacilityRooms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FacilityRooms::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(FacilityRooms::Capacity).integer().not_null())
                    .col(ColumnDef::new(FacilityRooms::RoomType).string_len(64).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSchedules::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::TrainerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::RoomId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::ClassName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::DayOfWeek)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClassSchedules::StartTime).time().not_null())
                    .col(ColumnDef::new(ClassSchedules::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(ClassSchedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_schedules_trainer")
                            .from(ClassSchedules::Table, ClassSchedules::TrainerId)
                            .to(Trainers::Table, Trainers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_schedules_room")
                            .from(ClassSchedules::Table, ClassSchedules::RoomId)
                            .to(FacilityRooms::Table, FacilityRooms::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 冲突检测按 (room, day) 与 (trainer, day) 查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_schedules_room_day")
                    .table(ClassSchedules::Table)
                    .col(ClassSchedules::RoomId)
                    .col(ClassSchedules::DayOfWeek)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_schedules_trainer_day")
                    .table(ClassSchedules::Table)
                    .col(ClassSchedules::TrainerId)
                    .col(ClassSchedules::DayOfWeek)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassBookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassBookings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassBookings::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassBookings::ScheduleId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassBookings::BookedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ClassBookings::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_bookings_member")
                            .from(ClassBookings::Table, ClassBookings::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_bookings_schedule")
                            .from(ClassBookings::Table, ClassBookings::ScheduleId)
                            .to(ClassSchedules::Table, ClassSchedules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AttendanceLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceLogs::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceLogs::CheckIn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceLogs::CheckOut)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_logs_member")
                            .from(AttendanceLogs::Table, AttendanceLogs::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_logs_member_check_in")
                    .table(AttendanceLogs::Table)
                    .col(AttendanceLogs::MemberId)
                    .col(AttendanceLogs::CheckIn)
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();
        for sql in PARTIAL_INDEXES {
            conn.execute_unprepared(sql).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(AttendanceLogs::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ClassBookings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ClassSchedules::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(FacilityRooms::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
