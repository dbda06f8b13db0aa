pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260310_000001_restaurants_table;
mod m20260310_000002_analytics_tables;
mod m20260312_000001_analytics_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260310_000001_restaurants_table::Migration),
            Box::new(m20260310_000002_analytics_tables::Migration),
            Box::new(m20260312_000001_analytics_indexes::Migration),
        ]
    }
}
