//! Migration to create the checklist_items table.
//!
//! Per-tender units of required pre-award work, each assigned to a single
//! user with completion and review sub-states.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChecklistItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChecklistItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChecklistItems::TenderId).uuid().not_null())
                    .col(ColumnDef::new(ChecklistItems::Name).text().not_null())
                    .col(ColumnDef::new(ChecklistItems::Description).text().null())
                    .col(ColumnDef::new(ChecklistItems::AssigneeId).uuid().not_null())
                    .col(
                        ColumnDef::new(ChecklistItems::Deadline)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ChecklistItems::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ChecklistItems::Comments).text().null())
                    .col(ColumnDef::new(ChecklistItems::ReviewComments).text().null())
                    .col(ColumnDef::new(ChecklistItems::ReviewedBy).uuid().null())
                    .col(
                        ColumnDef::new(ChecklistItems::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ChecklistItems::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ChecklistItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ChecklistItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklist_items_tender_id")
                            .from(ChecklistItems::Table, ChecklistItems::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklist_items_assignee_id")
                            .from(ChecklistItems::Table, ChecklistItems::AssigneeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checklist_items_tender_status")
                    .table(ChecklistItems::Table)
                    .col(ChecklistItems::TenderId)
                    .col(ChecklistItems::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_checklist_items_tender_status")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(ChecklistItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChecklistItems {
    Table,
    Id,
    TenderId,
    Name,
    Description,
    AssigneeId,
    Deadline,
    Status,
    Comments,
    ReviewComments,
    ReviewedBy,
    CompletedAt,
    ReviewedAt,
    CreatedAt,
    UpdatedAt,
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
