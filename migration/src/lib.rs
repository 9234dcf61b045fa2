pub use sea_orm_migration::prelude::*;

mod m20250801_000001_initial;
mod m20250805_000002_add_aura_zone;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_initial::Migration),
            Box::new(m20250805_000002_add_aura_zone::Migration),
        ]
    }
}
