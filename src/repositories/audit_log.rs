//! # Audit Log Repository
//!
//! Append-only writer consumed by every workflow component. Entries are
//! written inside the same transaction as the action they describe, so a
//! rolled-back transition leaves no trace.

use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::audit_log::{ActiveModel, Column, Entity, Model};

/// Action kinds recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Approve,
    Reject,
    Submit,
    Award,
    Close,
    Assign,
    Complete,
    Undo,
    Review,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Approve => "approve",
            AuditAction::Reject => "reject",
            AuditAction::Submit => "submit",
            AuditAction::Award => "award",
            AuditAction::Close => "close",
            AuditAction::Assign => "assign",
            AuditAction::Complete => "complete",
            AuditAction::Undo => "undo",
            AuditAction::Review => "review",
        }
    }
}

/// Repository for audit log writes and history reads
pub struct AuditLogRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AuditLogRepository<'a, C> {
    /// Create a new AuditLogRepository on the given connection or transaction
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Append one audit entry describing a state-changing action.
    pub async fn record(
        &self,
        user_id: Uuid,
        action: AuditAction,
        target_type: &str,
        target_id: Uuid,
        details: impl Into<String>,
        now: DateTime<FixedOffset>,
    ) -> Result<Model, WorkflowError> {
        let entry = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(Some(user_id)),
            action: Set(action.as_str().to_string()),
            target_type: Set(target_type.to_string()),
            target_id: Set(target_id),
            details: Set(Some(details.into())),
            created_at: Set(now),
        };

        Ok(entry.insert(self.conn).await?)
    }

    /// History for one target entity, newest first.
    pub async fn list_by_target(
        &self,
        target_type: &str,
        target_id: Uuid,
    ) -> Result<Vec<Model>, WorkflowError> {
        let entries = Entity::find()
            .filter(Column::TargetType.eq(target_type))
            .filter(Column::TargetId.eq(target_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.conn)
            .await?;

        Ok(entries)
    }
}
