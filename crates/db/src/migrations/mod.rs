//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_identity_table;
mod m20250601_000002_create_profile_table;
mod m20250601_000003_create_billing_entitlement_table;
mod m20250601_000004_create_billing_webhook_event_table;
mod m20250601_000005_create_account_deletion_request_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_identity_table::Migration),
            Box::new(m20250601_000002_create_profile_table::Migration),
            Box::new(m20250601_000003_create_billing_entitlement_table::Migration),
            Box::new(m20250601_000004_create_billing_webhook_event_table::Migration),
            Box::new(m20250601_000005_create_account_deletion_request_table::Migration),
        ]
    }
}
