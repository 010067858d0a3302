pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_identity_tables;
mod m20250901_000002_create_worker_tables;
mod m20250901_000003_create_reference_tables;
mod m20250901_000004_create_memorial_tables;
mod m20250901_000005_create_admin_tables;
mod m20250901_000006_create_carts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_identity_tables::Migration),
            Box::new(m20250901_000002_create_worker_tables::Migration),
            Box::new(m20250901_000003_create_reference_tables::Migration),
            Box::new(m20250901_000004_create_memorial_tables::Migration),
            Box::new(m20250901_000005_create_admin_tables::Migration),
            Box::new(m20250901_000006_create_carts::Migration),
        ]
    }
}
