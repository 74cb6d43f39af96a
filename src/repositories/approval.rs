//! # Approval Repository
//!
//! Append-only ledger of approve/reject decisions. No update or delete
//! operation exists; history reads are ordered newest-first.

use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::approval::{ActiveModel, Column, Entity, Model};

/// Decision value recorded at a review gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// Repository for the approval ledger
pub struct ApprovalRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ApprovalRepository<'a, C> {
    /// Create a new ApprovalRepository on the given connection or transaction
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Append a decision record. Rows are never mutated afterwards.
    pub async fn append(
        &self,
        tender_id: Uuid,
        approver_id: Uuid,
        status: ApprovalStatus,
        comments: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> Result<Model, WorkflowError> {
        let approval = ActiveModel {
            id: Set(Uuid::new_v4()),
            tender_id: Set(tender_id),
            approver_id: Set(approver_id),
            status: Set(status.as_str().to_string()),
            comments: Set(comments),
            created_at: Set(now),
        };

        Ok(approval.insert(self.conn).await?)
    }

    /// Approval history for a tender, newest first.
    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Model>, WorkflowError> {
        let approvals = Entity::find()
            .filter(Column::TenderId.eq(tender_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.conn)
            .await?;

        Ok(approvals)
    }
}
