use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Equipment {
    Table,
    Id,
    Name,
    PurchaseDate,
    WarrantyExpiry,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MaintenanceLogs {
    Table,
    Id,
    EquipmentId,
    ServiceDate,
    CostCents,
    Description,
    TechnicianName,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Equipment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Equipment::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Equipment::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Equipment::PurchaseDate).date().null())
                    .col(ColumnDef::new(Equipment::WarrantyExpiry).date().null())
                    .col(
                        ColumnDef::new(Equipment::Status)
                            .string_len(16)
                            .not_null()
                            .default("operational"),
                    )
                    .col(
                        ColumnDef::new(Equipment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 删除器材时一并删除维护记录
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MaintenanceLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceLogs::EquipmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceLogs::ServiceDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MaintenanceLogs::CostCents).big_integer().null())
                    .col(ColumnDef::new(MaintenanceLogs::Description).text().null())
                    .col(
                        ColumnDef::new(MaintenanceLogs::TechnicianName)
                            .string_len(100)
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_logs_equipment")
                            .from(MaintenanceLogs::Table, MaintenanceLogs::EquipmentId)
                            .to(Equipment::Table, Equipment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_maintenance_logs_equipment")
                    .table(MaintenanceLogs::Table)
                    .col(MaintenanceLogs::EquipmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(MaintenanceLogs::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Equipment::Table).to_owned())
            .await?;
        Ok(())
    }
}
