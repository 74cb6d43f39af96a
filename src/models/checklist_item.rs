//! ChecklistItem entity model
//!
//! A discrete, assignable unit of required pre-award work with completion
//! and review sub-states. completed_at is set exactly when status is
//! completed; reviewed_by/reviewed_at only after a review decision.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

/// Checklist item entity representing a unit of required work
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "checklist_items")]
pub struct Model {
    /// Unique identifier for the item (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tender this item belongs to
    pub tender_id: Uuid,

    /// Short name of the work item
    pub name: String,

    /// Longer description of what is required
    pub description: Option<String>,

    /// Single user responsible for completing the item
    pub assignee_id: Uuid,

    /// Optional deadline for the item
    pub deadline: Option<DateTimeWithTimeZone>,

    /// Item status: pending, pending_review, completed, or revision_needed
    pub status: String,

    /// Comments accumulated by the assignee (including undo reasons)
    pub comments: Option<String>,

    /// Comments left by the reviewer
    pub review_comments: Option<String>,

    /// Manager who reviewed the item, if a review has happened
    pub reviewed_by: Option<Uuid>,

    /// Timestamp when the item was completed
    pub completed_at: Option<DateTimeWithTimeZone>,

    /// Timestamp of the review decision
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the item was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the item was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tender::Entity",
        from = "Column::TenderId",
        to = "super::tender::Column::Id"
    )]
    Tender,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssigneeId",
        to = "super::user::Column::Id"
    )]
    Assignee,
}

impl Related<super::tender::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
