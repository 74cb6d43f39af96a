//! TenderTimeline entity model
//!
//! One-to-one with a tender; holds the seven milestone timestamps. Milestones
//! are nullable until a status transition or the lazy-creation defaults
//! populate them.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

/// Timeline entity holding milestone dates for one tender
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tender_timelines")]
pub struct Model {
    /// Unique identifier for the timeline (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tender this timeline belongs to (unique)
    pub tender_id: Uuid,

    /// Start of the submission window
    pub submission_start: Option<DateTimeWithTimeZone>,

    /// End of the submission window
    pub submission_end: Option<DateTimeWithTimeZone>,

    /// Start of the evaluation window
    pub evaluation_start: Option<DateTimeWithTimeZone>,

    /// End of the evaluation window
    pub evaluation_end: Option<DateTimeWithTimeZone>,

    /// Date the tender was (or is expected to be) awarded
    pub award_date: Option<DateTimeWithTimeZone>,

    /// Project start date
    pub project_start_date: Option<DateTimeWithTimeZone>,

    /// Project end date
    pub project_end_date: Option<DateTimeWithTimeZone>,

    /// Timestamp when the timeline was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the timeline was last updated
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
}

impl Related<super::tender::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
