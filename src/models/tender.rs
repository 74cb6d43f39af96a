//! Tender entity model
//!
//! This module contains the SeaORM entity model for the tenders table,
//! the root of the procurement workflow.

use rust_decimal::Decimal;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

/// Tender entity representing a procurement bid under workflow control
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tenders")]
pub struct Model {
    /// Unique identifier for the tender (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Globally unique reference number, generated once at creation
    pub reference_number: String,

    /// Display name of the tender
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Budget as a fixed-point decimal
    pub budget: Decimal,

    /// Submission deadline
    pub deadline: DateTimeWithTimeZone,

    /// Current workflow status (one of the tokens in the transition table)
    pub status: String,

    /// User who created the tender; immutable after creation
    pub created_by: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Department whose work the tender requires
    pub required_department_id: Option<Uuid>,

    /// Optional category
    pub category_id: Option<Uuid>,

    /// Timestamp when the tender was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the tender was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::RequiredDepartmentId",
        to = "super::department::Column::Id"
    )]
    RequiredDepartment,
    #[sea_orm(
        belongs_to = "super::tender_category::Entity",
        from = "Column::CategoryId",
        to = "super::tender_category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
    #[sea_orm(has_many = "super::approval::Entity")]
    Approvals,
    #[sea_orm(has_many = "super::checklist_item::Entity")]
    ChecklistItems,
    #[sea_orm(has_many = "super::manager_assignment::Entity")]
    ManagerAssignments,
    #[sea_orm(has_one = "super::tender_timeline::Entity")]
    Timeline,
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::approval::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl Related<super::checklist_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChecklistItems.def()
    }
}

impl Related<super::manager_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ManagerAssignments.def()
    }
}

impl Related<super::tender_timeline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timeline.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
