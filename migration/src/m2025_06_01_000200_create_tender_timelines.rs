//! Migration to create the tender_timelines table.
//!
//! One row per tender holding the seven milestone timestamps. Every milestone
//! is nullable; the timeline manager populates fields as statuses are reached
//! and never overwrites a value once set.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenderTimelines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenderTimelines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::TenderId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::SubmissionStart)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::SubmissionEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::EvaluationStart)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::EvaluationEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::AwardDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::ProjectStartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::ProjectEndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TenderTimelines::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tender_timelines_tender_id")
                            .from(TenderTimelines::Table, TenderTimelines::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenderTimelines::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenderTimelines {
    Table,
    Id,
    TenderId,
    SubmissionStart,
    SubmissionEnd,
    EvaluationStart,
    EvaluationEnd,
    AwardDate,
    ProjectStartDate,
    ProjectEndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenders {
    Table,
    Id,
}
