pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_accounts;
mod m20251001_000002_create_billing;
mod m20251001_000003_create_scheduling;
mod m20251001_000004_create_equipment;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_accounts::Migration),
            Box::new(m20251001_000002_create_billing::Migration),
            Box::new(m20251001_000003_create_scheduling::Migration),
            Box::new(m20251001_000004_create_equipment::Migration),
        ]
    }
}
