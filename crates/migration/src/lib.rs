pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_companies_table;
mod m20240101_000002_create_users_table;
mod m20240101_000003_create_authentication_tokens_table;
mod m20240101_000004_create_contracts_table;

pub(crate) use m20240101_000001_create_companies_table::Companies;
pub(crate) use m20240101_000002_create_users_table::Users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_companies_table::Migration),
            Box::new(m20240101_000002_create_users_table::Migration),
            Box::new(m20240101_000003_create_authentication_tokens_table::Migration),
            Box::new(m20240101_000004_create_contracts_table::Migration),
        ]
    }
}
