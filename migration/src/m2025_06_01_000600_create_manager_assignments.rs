//! Migration to create the manager_assignments table.
//!
//! Records which manager is responsible for a tender. A partial unique index
//! on (tender_id) WHERE is_active enforces the at-most-one-active-assignment
//! invariant at the storage layer, so racing approvals cannot both win.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ManagerAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ManagerAssignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ManagerAssignments::TenderId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManagerAssignments::ManagerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManagerAssignments::AssignedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManagerAssignments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ManagerAssignments::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_assignments_tender_id")
                            .from(ManagerAssignments::Table, ManagerAssignments::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_assignments_manager_id")
                            .from(ManagerAssignments::Table, ManagerAssignments::ManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_assignments_assigned_by")
                            .from(ManagerAssignments::Table, ManagerAssignments::AssignedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one active assignment per tender.
        // Raw SQL because the query builder has no WHERE clause for indexes;
        // the syntax is identical on Postgres and SQLite.
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_manager_assignments_active ON manager_assignments (tender_id) WHERE is_active".to_string(),
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_manager_assignments_tender_assigned")
                    .table(ManagerAssignments::Table)
                    .col(ManagerAssignments::TenderId)
                    .col(ManagerAssignments::AssignedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_manager_assignments_tender_assigned")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("uq_manager_assignments_active").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ManagerAssignments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ManagerAssignments {
    Table,
    Id,
    TenderId,
    ManagerId,
    AssignedBy,
    IsActive,
    AssignedAt,
}

#[derive(DeriveIden)]
enum Tenders {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
