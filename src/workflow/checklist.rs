//! Checklist engine: per-tender work items with completion and review
//! sub-states.
//!
//! Item state machine: `pending -> {pending_review, completed}`,
//! `pending_review -> {completed, revision_needed}` (review decision),
//! `revision_needed -> pending_review` (resubmission). Batch creation
//! validates the whole batch before persisting any item.

use std::collections::BTreeMap;
use std::sync::Arc;

use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::WorkflowError;
use crate::models::checklist_item;
use crate::notify::{self, Notification, Notifier};
use crate::repositories::{
    AuditAction, AuditLogRepository, ChecklistItemRepository, NewChecklistItem, TenderRepository,
    UserRepository,
};
use crate::workflow::Actor;
use crate::workflow::status::{Operation, authorize};

/// Item status tokens stored in checklist_items.status.
pub mod item_status {
    pub const PENDING: &str = "pending";
    pub const PENDING_REVIEW: &str = "pending_review";
    pub const COMPLETED: &str = "completed";
    pub const REVISION_NEEDED: &str = "revision_needed";
}

/// Engine owning checklist item operations. Each operation is one storage
/// transaction; notifications go out only after commit.
#[derive(Clone)]
pub struct ChecklistEngine {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl ChecklistEngine {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            clock,
            notifier,
        }
    }

    /// Create a batch of checklist items for a tender.
    ///
    /// Requires the manager role. The full batch is validated before any
    /// item is persisted; one invalid item rejects the whole batch.
    /// Unassigned items default to the tender creator.
    pub async fn create_batch(
        &self,
        tender_id: Uuid,
        actor: Actor,
        items: Vec<NewChecklistItem>,
    ) -> Result<Vec<checklist_item::Model>, WorkflowError> {
        if !authorize(actor.role, Operation::CreateChecklist) {
            return Err(WorkflowError::Unauthorized(
                "only managers may create checklists".to_string(),
            ));
        }
        if items.is_empty() {
            return Err(WorkflowError::InvalidArgument(
                "checklist batch is empty".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let tender = TenderRepository::new(&txn).get(tender_id).await?;

        // Validate every item before creating any
        let users = UserRepository::new(&txn);
        let mut resolved: Vec<(NewChecklistItem, Uuid)> = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(WorkflowError::InvalidArgument(format!(
                    "checklist item {index} has an empty name"
                )));
            }
            let assignee_id = match item.assignee_id {
                Some(user_id) => {
                    users
                        .find_by_id(user_id)
                        .await?
                        .ok_or_else(|| WorkflowError::NotFound("assignee".to_string()))?;
                    user_id
                }
                None => tender.created_by,
            };
            resolved.push((item, assignee_id));
        }

        let repo = ChecklistItemRepository::new(&txn);
        let mut created = Vec::with_capacity(resolved.len());
        for (item, assignee_id) in resolved {
            created.push(
                repo.insert(
                    tender_id,
                    item.name,
                    item.description,
                    assignee_id,
                    item.deadline,
                    now,
                )
                .await?,
            );
        }

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Create,
                "Tender",
                tender_id,
                format!(
                    "Checklist created for tender {} with {} items",
                    tender.reference_number,
                    created.len()
                ),
                now,
            )
            .await?;

        txn.commit().await?;

        for item in &created {
            notify::dispatch(
                self.notifier.as_ref(),
                Notification {
                    recipient_id: item.assignee_id,
                    template: "checklist_assigned".to_string(),
                    params: serde_json::json!({
                        "tender_reference": tender.reference_number,
                        "item_name": item.name,
                    }),
                },
            )
            .await;
        }

        Ok(created)
    }

    /// Mark an item completed.
    ///
    /// Allowed for the item's assignee or any manager. Fails with
    /// `PreconditionFailed` when the item is already completed.
    pub async fn complete_item(
        &self,
        item_id: Uuid,
        actor: Actor,
        comments: Option<String>,
    ) -> Result<checklist_item::Model, WorkflowError> {
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let repo = ChecklistItemRepository::new(&txn);
        let item = repo.get(item_id).await?;
        self.authorize_item_mutation(&item, actor, Operation::CompleteChecklistItem)?;

        if item.status == item_status::COMPLETED {
            return Err(WorkflowError::PreconditionFailed(
                "checklist item is already completed".to_string(),
            ));
        }

        let tender_id = item.tender_id;
        let item_name = item.name.clone();

        let mut active: checklist_item::ActiveModel = item.into();
        active.status = Set(item_status::COMPLETED.to_string());
        active.completed_at = Set(Some(now));
        if let Some(text) = comments {
            active.comments = Set(Some(text));
        }
        active.updated_at = Set(now);
        let updated = repo.update(active).await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Complete,
                "ChecklistItem",
                item_id,
                format!("Checklist item '{item_name}' completed"),
                now,
            )
            .await?;

        txn.commit().await?;

        tracing::info!(
            tender_id = %tender_id,
            item_id = %item_id,
            actor_id = %actor.id,
            "Checklist item completed"
        );

        Ok(updated)
    }

    /// Revert a completed item back to pending.
    ///
    /// Same authorization as completion. Requires the item to currently be
    /// completed; the reason is appended to the item's comments.
    pub async fn undo_completion(
        &self,
        item_id: Uuid,
        actor: Actor,
        reason: String,
    ) -> Result<checklist_item::Model, WorkflowError> {
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let repo = ChecklistItemRepository::new(&txn);
        let item = repo.get(item_id).await?;
        self.authorize_item_mutation(&item, actor, Operation::UndoChecklistCompletion)?;

        if item.status != item_status::COMPLETED {
            return Err(WorkflowError::PreconditionFailed(
                "checklist item is not completed".to_string(),
            ));
        }

        let item_name = item.name.clone();
        let comments = match &item.comments {
            Some(existing) => format!("{existing}\nUndo: {reason}"),
            None => format!("Undo: {reason}"),
        };

        let mut active: checklist_item::ActiveModel = item.into();
        active.status = Set(item_status::PENDING.to_string());
        active.completed_at = Set(None);
        active.comments = Set(Some(comments));
        active.updated_at = Set(now);
        let updated = repo.update(active).await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Undo,
                "ChecklistItem",
                item_id,
                format!("Completion undone for checklist item '{item_name}': {reason}"),
                now,
            )
            .await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Hand an item to the manager for review.
    ///
    /// The resubmission edge of the item state machine: legal from pending
    /// or revision_needed.
    pub async fn submit_item_for_review(
        &self,
        item_id: Uuid,
        actor: Actor,
        comments: Option<String>,
    ) -> Result<checklist_item::Model, WorkflowError> {
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let repo = ChecklistItemRepository::new(&txn);
        let item = repo.get(item_id).await?;
        self.authorize_item_mutation(&item, actor, Operation::CompleteChecklistItem)?;

        if item.status != item_status::PENDING && item.status != item_status::REVISION_NEEDED {
            return Err(WorkflowError::PreconditionFailed(format!(
                "checklist item in status {} cannot be submitted for review",
                item.status
            )));
        }

        let item_name = item.name.clone();

        let mut active: checklist_item::ActiveModel = item.into();
        active.status = Set(item_status::PENDING_REVIEW.to_string());
        if let Some(text) = comments {
            active.comments = Set(Some(text));
        }
        active.updated_at = Set(now);
        let updated = repo.update(active).await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Submit,
                "ChecklistItem",
                item_id,
                format!("Checklist item '{item_name}' submitted for review"),
                now,
            )
            .await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Record a manager's review decision on an item in pending_review.
    ///
    /// `approve` completes the item; `reject` sends it back as
    /// revision_needed. Any other decision is an `InvalidArgument`.
    pub async fn review_item(
        &self,
        item_id: Uuid,
        actor: Actor,
        decision: &str,
        comments: Option<String>,
    ) -> Result<checklist_item::Model, WorkflowError> {
        if !authorize(actor.role, Operation::ReviewChecklistItem) {
            return Err(WorkflowError::Unauthorized(
                "only managers may review checklist items".to_string(),
            ));
        }
        if decision != "approve" && decision != "reject" {
            return Err(WorkflowError::InvalidArgument(format!(
                "unknown review decision: {decision}"
            )));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let repo = ChecklistItemRepository::new(&txn);
        let item = repo.get(item_id).await?;

        if item.status != item_status::PENDING_REVIEW {
            return Err(WorkflowError::PreconditionFailed(format!(
                "checklist item in status {} is not awaiting review",
                item.status
            )));
        }

        let item_name = item.name.clone();
        let assignee_id = item.assignee_id;

        let mut active: checklist_item::ActiveModel = item.into();
        if decision == "approve" {
            active.status = Set(item_status::COMPLETED.to_string());
            active.completed_at = Set(Some(now));
        } else {
            active.status = Set(item_status::REVISION_NEEDED.to_string());
            active.completed_at = Set(None);
        }
        active.review_comments = Set(comments.clone());
        active.reviewed_by = Set(Some(actor.id));
        active.reviewed_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = repo.update(active).await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Review,
                "ChecklistItem",
                item_id,
                format!("Checklist item '{item_name}' review decision: {decision}"),
                now,
            )
            .await?;

        txn.commit().await?;

        if decision == "reject" {
            notify::dispatch(
                self.notifier.as_ref(),
                Notification {
                    recipient_id: assignee_id,
                    template: "checklist_revision_needed".to_string(),
                    params: serde_json::json!({
                        "item_name": updated.name,
                        "review_comments": comments,
                    }),
                },
            )
            .await;
        }

        Ok(updated)
    }

    /// Items for a tender in creation order.
    pub async fn list_items(
        &self,
        tender_id: Uuid,
    ) -> Result<Vec<checklist_item::Model>, WorkflowError> {
        ChecklistItemRepository::new(&self.db)
            .list_by_tender(tender_id)
            .await
    }

    /// Derived per-status counts for a tender's checklist.
    pub async fn status_summary(
        &self,
        tender_id: Uuid,
    ) -> Result<BTreeMap<String, u64>, WorkflowError> {
        ChecklistItemRepository::new(&self.db)
            .status_summary(tender_id)
            .await
    }

    fn authorize_item_mutation(
        &self,
        item: &checklist_item::Model,
        actor: Actor,
        operation: Operation,
    ) -> Result<(), WorkflowError> {
        if item.assignee_id == actor.id || authorize(actor.role, operation) {
            return Ok(());
        }
        Err(WorkflowError::Unauthorized(
            "only the assignee or a manager may modify this item".to_string(),
        ))
    }
}
