//! # Checklist Item Repository
//!
//! Data access for checklist items. State-machine rules live in the
//! checklist engine; this layer only reads and writes rows.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::checklist_item::{ActiveModel, Column, Entity, Model};

/// Fields for one new checklist item in a batch.
#[derive(Debug, Clone)]
pub struct NewChecklistItem {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the tender creator when unspecified.
    pub assignee_id: Option<Uuid>,
    pub deadline: Option<DateTime<FixedOffset>>,
}

/// Repository for checklist item database operations
pub struct ChecklistItemRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ChecklistItemRepository<'a, C> {
    /// Create a new ChecklistItemRepository on the given connection or transaction
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert one item; batch atomicity comes from the caller's transaction.
    pub async fn insert(
        &self,
        tender_id: Uuid,
        name: String,
        description: Option<String>,
        assignee_id: Uuid,
        deadline: Option<DateTime<FixedOffset>>,
        now: DateTime<FixedOffset>,
    ) -> Result<Model, WorkflowError> {
        let item = ActiveModel {
            id: Set(Uuid::new_v4()),
            tender_id: Set(tender_id),
            name: Set(name),
            description: Set(description),
            assignee_id: Set(assignee_id),
            deadline: Set(deadline),
            status: Set("pending".to_string()),
            comments: Set(None),
            review_comments: Set(None),
            reviewed_by: Set(None),
            completed_at: Set(None),
            reviewed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(item.insert(self.conn).await?)
    }

    /// Fetch an item by id, failing with NotFound when absent.
    pub async fn get(&self, item_id: Uuid) -> Result<Model, WorkflowError> {
        Entity::find_by_id(item_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("checklist item".to_string()))
    }

    /// All items for a tender in creation order.
    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Model>, WorkflowError> {
        let items = Entity::find()
            .filter(Column::TenderId.eq(tender_id))
            .order_by_asc(Column::CreatedAt)
            .all(self.conn)
            .await?;

        Ok(items)
    }

    /// Names of items for the tender that are not yet completed.
    pub async fn list_incomplete(&self, tender_id: Uuid) -> Result<Vec<Model>, WorkflowError> {
        let items = Entity::find()
            .filter(Column::TenderId.eq(tender_id))
            .filter(Column::Status.ne("completed"))
            .order_by_asc(Column::CreatedAt)
            .all(self.conn)
            .await?;

        Ok(items)
    }

    /// Derived count of items per status for a tender.
    pub async fn status_summary(
        &self,
        tender_id: Uuid,
    ) -> Result<BTreeMap<String, u64>, WorkflowError> {
        let items = self.list_by_tender(tender_id).await?;

        let mut summary = BTreeMap::new();
        for item in items {
            *summary.entry(item.status).or_insert(0) += 1;
        }

        Ok(summary)
    }

    /// Persist a modified item row.
    pub async fn update(&self, item: ActiveModel) -> Result<Model, WorkflowError> {
        Ok(item.update(self.conn).await?)
    }
}
