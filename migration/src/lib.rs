pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users_table;
mod m20240601_000002_create_user_sessions_table;
mod m20240601_000003_create_projects_table;
mod m20240601_000004_create_inspectors_table;
mod m20240601_000005_create_daily_logs_table;
mod m20240601_000006_create_log_work_items_table;
mod m20240601_000007_create_holidays_table;
mod m20240601_000008_create_disaster_types_table;
mod m20240601_000009_create_modification_logs_table;
mod m20240601_000010_insert_disaster_type_catalog;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_table::Migration),
            Box::new(m20240601_000002_create_user_sessions_table::Migration),
            Box::new(m20240601_000003_create_projects_table::Migration),
            Box::new(m20240601_000004_create_inspectors_table::Migration),
            Box::new(m20240601_000005_create_daily_logs_table::Migration),
            Box::new(m20240601_000006_create_log_work_items_table::Migration),
            Box::new(m20240601_000007_create_holidays_table::Migration),
            Box::new(m20240601_000008_create_disaster_types_table::Migration),
            Box::new(m20240601_000009_create_modification_logs_table::Migration),
            Box::new(m20240601_000010_insert_disaster_type_catalog::Migration),
        ]
    }
}
