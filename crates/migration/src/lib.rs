pub use sea_orm_migration::prelude::*;

mod m20260312_090000_sessions;
mod m20260312_091500_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260312_090000_sessions::Migration),
            Box::new(m20260312_091500_transactions::Migration),
        ]
    }
}
