//! Migration to create the tenders table.
//!
//! Tenders are the workflow root: every lifecycle transition mutates the
//! status column here, and all other workflow tables hang off tender_id.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tenders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tenders::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Tenders::ReferenceNumber)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tenders::Name).text().not_null())
                    .col(ColumnDef::new(Tenders::Description).text().not_null())
                    .col(
                        ColumnDef::new(Tenders::Budget)
                            .decimal_len(15, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tenders::Deadline)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tenders::Status)
                            .text()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Tenders::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Tenders::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Tenders::RequiredDepartmentId).uuid().null())
                    .col(ColumnDef::new(Tenders::CategoryId).uuid().null())
                    .col(
                        ColumnDef::new(Tenders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tenders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenders_created_by")
                            .from(Tenders::Table, Tenders::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenders_company_id")
                            .from(Tenders::Table, Tenders::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenders_required_department_id")
                            .from(Tenders::Table, Tenders::RequiredDepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenders_category_id")
                            .from(Tenders::Table, Tenders::CategoryId)
                            .to(TenderCategories::Table, TenderCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenders_status")
                    .table(Tenders::Table)
                    .col(Tenders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenders_department_status")
                    .table(Tenders::Table)
                    .col(Tenders::RequiredDepartmentId)
                    .col(Tenders::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_tenders_department_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_tenders_status").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tenders {
    Table,
    Id,
    ReferenceNumber,
    Name,
    Description,
    Budget,
    Deadline,
    Status,
    CreatedBy,
    CompanyId,
    RequiredDepartmentId,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum TenderCategories {
    Table,
    Id,
}
