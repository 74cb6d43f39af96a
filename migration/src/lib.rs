//! Database migrations for the Tenders API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000001_create_reference_data;
mod m2025_06_01_000100_create_tenders;
mod m2025_06_01_000200_create_tender_timelines;
mod m2025_06_01_000300_create_documents;
mod m2025_06_01_000400_create_approvals;
mod m2025_06_01_000500_create_checklist_items;
mod m2025_06_01_000600_create_manager_assignments;
mod m2025_06_01_000700_create_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000001_create_reference_data::Migration),
            Box::new(m2025_06_01_000100_create_tenders::Migration),
            Box::new(m2025_06_01_000200_create_tender_timelines::Migration),
            Box::new(m2025_06_01_000300_create_documents::Migration),
            Box::new(m2025_06_01_000400_create_approvals::Migration),
            Box::new(m2025_06_01_000500_create_checklist_items::Migration),
            Box::new(m2025_06_01_000600_create_manager_assignments::Migration),
            Box::new(m2025_06_01_000700_create_audit_logs::Migration),
        ]
    }
}
