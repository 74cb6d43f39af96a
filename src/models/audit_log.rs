//! AuditLog entity model
//!
//! Append-only event record; rows are never mutated or deleted. Ordering by
//! created_at is the canonical history.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

/// Audit log entry describing one state-changing action
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    /// Unique identifier for the log entry (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Acting user; null if the user was later removed
    pub user_id: Option<Uuid>,

    /// Action kind (create, approve, submit, award, ...)
    pub action: String,

    /// Type of the affected entity (e.g. "Tender", "ChecklistItem")
    pub target_type: String,

    /// Identifier of the affected entity
    pub target_id: Uuid,

    /// Free-text details about the action
    pub details: Option<String>,

    /// Timestamp when the action happened
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}
