//! Tender lifecycle controller.
//!
//! Single owner of tender status transitions. Every operation follows the
//! same shape: open a transaction, check the actor's role, validate
//! preconditions, flip the status through the guarded update, write the
//! dependent rows (timeline dates, assignment, approval, audit entry),
//! commit, and only then dispatch notifications. A failure anywhere before
//! commit rolls the whole operation back.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::WorkflowError;
use crate::models::{approval, audit_log, document, manager_assignment, tender, tender_timeline};
use crate::notify::{self, Notification, Notifier};
use crate::repositories::{
    ApprovalRepository, ApprovalStatus, AuditAction, AuditLogRepository, ChecklistItemRepository,
    DocumentRepository, NewTender, TenderRepository, UserRepository,
};
use crate::workflow::status::{Operation, Role, TenderStatus, WorkflowMode, authorize};
use crate::workflow::{Actor, assignment, reference, timeline};

/// Document type that must exist before a tender can leave draft.
const SPEC_DOCUMENT_TYPE: &str = "spec";

/// Tender plus the read-model pieces the detail endpoint returns.
#[derive(Debug, Clone)]
pub struct TenderDetail {
    pub tender: tender::Model,
    pub timeline: Option<tender_timeline::Model>,
    pub active_assignment: Option<manager_assignment::Model>,
    /// Active manager plus managers of the required department.
    pub assigned_users: Vec<Uuid>,
}

/// Lifecycle controller over one database and one workflow configuration.
#[derive(Clone)]
pub struct TenderWorkflow {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    mode: WorkflowMode,
    reference_prefix: String,
}

impl TenderWorkflow {
    pub fn new(
        db: DatabaseConnection,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        mode: WorkflowMode,
        reference_prefix: String,
    ) -> Self {
        Self {
            db,
            clock,
            notifier,
            mode,
            reference_prefix,
        }
    }

    pub fn mode(&self) -> WorkflowMode {
        self.mode
    }

    /// Create a tender in draft with a generated reference number.
    pub async fn create(
        &self,
        actor: Actor,
        fields: NewTender,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::CreateTender) {
            return Err(WorkflowError::Unauthorized(
                "only the bd team may create tenders".to_string(),
            ));
        }
        if fields.name.trim().is_empty() {
            return Err(WorkflowError::InvalidArgument(
                "tender name is empty".to_string(),
            ));
        }
        if fields.budget.is_sign_negative() {
            return Err(WorkflowError::InvalidArgument(
                "budget must not be negative".to_string(),
            ));
        }

        let now = self.clock.now();
        let reference_number = reference::generate(&self.reference_prefix, now);

        let txn = self.db.begin().await?;
        let created = TenderRepository::new(&txn)
            .insert(reference_number, fields, actor.id, now)
            .await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Create,
                "Tender",
                created.id,
                format!("Tender {} created", created.reference_number),
                now,
            )
            .await?;
        txn.commit().await?;

        tracing::info!(
            tender_id = %created.id,
            reference = %created.reference_number,
            actor_id = %actor.id,
            "Tender created"
        );

        Ok(created)
    }

    /// Attach document metadata to a tender. Open to every role.
    pub async fn attach_document(
        &self,
        tender_id: Uuid,
        actor: Actor,
        document_type: &str,
        storage_key: String,
        description: Option<String>,
    ) -> Result<document::Model, WorkflowError> {
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let tender = TenderRepository::new(&txn).get(tender_id).await?;
        let created = DocumentRepository::new(&txn)
            .insert(
                tender_id,
                actor.id,
                document_type,
                storage_key,
                description,
                now,
            )
            .await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Create,
                "Document",
                created.id,
                format!(
                    "Document of type {} attached to tender {}",
                    created.document_type, tender.reference_number
                ),
                now,
            )
            .await?;
        txn.commit().await?;

        Ok(created)
    }

    /// Submit a draft tender to the superuser review gate (managed mode).
    ///
    /// Requires at least one spec document; without it the tender stays in
    /// draft and the caller gets a `PreconditionFailed` naming the missing
    /// piece.
    pub async fn submit_for_superuser_review(
        &self,
        tender_id: Uuid,
        actor: Actor,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::SubmitForReview) {
            return Err(WorkflowError::Unauthorized(
                "only the bd team may submit tenders for review".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let tender = TenderRepository::new(&txn).get(tender_id).await?;
        self.check_edge(&tender, TenderStatus::PendingSuperuserApproval)?;

        let has_spec = DocumentRepository::new(&txn)
            .has_document_of_type(tender_id, SPEC_DOCUMENT_TYPE)
            .await?;
        if !has_spec {
            return Err(WorkflowError::PreconditionFailed(
                "a spec document must be attached before submission".to_string(),
            ));
        }

        let updated = self
            .transition(&txn, &tender, TenderStatus::PendingSuperuserApproval, now)
            .await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Submit,
                "Tender",
                tender_id,
                format!(
                    "Tender {} submitted for superuser review",
                    updated.reference_number
                ),
                now,
            )
            .await?;
        txn.commit().await?;

        self.notify_status_change(&updated, "tender_submitted_for_review")
            .await;

        Ok(updated)
    }

    /// Record the superuser's decision on a tender awaiting approval.
    ///
    /// `approve` requires a `manager_id` holding the manager role; the
    /// tender moves to in_progress and that manager becomes the single
    /// active assignment. `reject` moves the tender to the terminal rejected
    /// status. Both append an approval record; any other decision fails
    /// before anything is written.
    pub async fn superuser_review(
        &self,
        tender_id: Uuid,
        actor: Actor,
        decision: &str,
        comments: Option<String>,
        manager_id: Option<Uuid>,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::SuperuserReview) {
            return Err(WorkflowError::Unauthorized(
                "only a superuser may review tender submissions".to_string(),
            ));
        }
        if decision != "approve" && decision != "reject" {
            return Err(WorkflowError::InvalidArgument(format!(
                "unknown review decision: {decision}"
            )));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let tender = TenderRepository::new(&txn).get(tender_id).await?;

        let updated = if decision == "approve" {
            let manager_id = manager_id.ok_or_else(|| {
                WorkflowError::InvalidArgument(
                    "manager_id is required when approving".to_string(),
                )
            })?;
            let manager = UserRepository::new(&txn)
                .get_with_role(manager_id, Role::Manager)
                .await?;

            let updated = self
                .transition(&txn, &tender, TenderStatus::InProgress, now)
                .await?;
            assignment::assign(&txn, tender_id, manager.id, actor.id, now).await?;

            ApprovalRepository::new(&txn)
                .append(tender_id, actor.id, ApprovalStatus::Approved, comments, now)
                .await?;
            AuditLogRepository::new(&txn)
                .record(
                    actor.id,
                    AuditAction::Approve,
                    "Tender",
                    tender_id,
                    format!(
                        "Tender {} approved, manager {} assigned",
                        updated.reference_number, manager.id
                    ),
                    now,
                )
                .await?;
            updated
        } else {
            let updated = self
                .transition(&txn, &tender, TenderStatus::Rejected, now)
                .await?;

            ApprovalRepository::new(&txn)
                .append(tender_id, actor.id, ApprovalStatus::Rejected, comments, now)
                .await?;
            AuditLogRepository::new(&txn)
                .record(
                    actor.id,
                    AuditAction::Reject,
                    "Tender",
                    tender_id,
                    format!("Tender {} rejected", updated.reference_number),
                    now,
                )
                .await?;
            updated
        };

        txn.commit().await?;

        if decision == "approve" {
            if let Some(manager_id) = manager_id {
                notify::dispatch(
                    self.notifier.as_ref(),
                    Notification {
                        recipient_id: manager_id,
                        template: "tender_assigned".to_string(),
                        params: serde_json::json!({
                            "tender_reference": updated.reference_number,
                        }),
                    },
                )
                .await;
            }
            self.notify_status_change(&updated, "tender_approved").await;
        } else {
            self.notify_status_change(&updated, "tender_rejected").await;
        }

        Ok(updated)
    }

    /// Move an in-progress tender to the final approval gate (managed mode).
    ///
    /// Every checklist item must be completed; the error lists the items
    /// still open so the manager knows what blocks the submission.
    pub async fn submit_to_final_review(
        &self,
        tender_id: Uuid,
        actor: Actor,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::SubmitToFinalReview) {
            return Err(WorkflowError::Unauthorized(
                "only a manager may submit to final review".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let tender = TenderRepository::new(&txn).get(tender_id).await?;
        self.check_edge(&tender, TenderStatus::PendingFinalApproval)?;

        let incomplete = ChecklistItemRepository::new(&txn)
            .list_incomplete(tender_id)
            .await?;
        if !incomplete.is_empty() {
            let names: Vec<&str> = incomplete.iter().map(|item| item.name.as_str()).collect();
            return Err(WorkflowError::PreconditionFailed(format!(
                "checklist items not completed: {}",
                names.join(", ")
            )));
        }

        let updated = self
            .transition(&txn, &tender, TenderStatus::PendingFinalApproval, now)
            .await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Submit,
                "Tender",
                tender_id,
                format!(
                    "Tender {} submitted to final review",
                    updated.reference_number
                ),
                now,
            )
            .await?;
        txn.commit().await?;

        self.notify_status_change(&updated, "tender_final_review").await;

        Ok(updated)
    }

    /// Mark a tender as awarded.
    pub async fn award(
        &self,
        tender_id: Uuid,
        actor: Actor,
        comments: Option<String>,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::AwardTender) {
            return Err(WorkflowError::Unauthorized(
                "only a manager may award a tender".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let tender = TenderRepository::new(&txn).get(tender_id).await?;

        let updated = self
            .transition(&txn, &tender, TenderStatus::Awarded, now)
            .await?;

        ApprovalRepository::new(&txn)
            .append(tender_id, actor.id, ApprovalStatus::Approved, comments, now)
            .await?;
        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Award,
                "Tender",
                tender_id,
                format!("Tender {} awarded", updated.reference_number),
                now,
            )
            .await?;
        txn.commit().await?;

        self.notify_status_change(&updated, "tender_awarded").await;

        Ok(updated)
    }

    /// Close a tender. Terminal: no further transitions are possible.
    pub async fn close(
        &self,
        tender_id: Uuid,
        actor: Actor,
        comments: Option<String>,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::CloseTender) {
            return Err(WorkflowError::Unauthorized(
                "only a manager may close a tender".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let tender = TenderRepository::new(&txn).get(tender_id).await?;

        let updated = self
            .transition(&txn, &tender, TenderStatus::Closed, now)
            .await?;

        ApprovalRepository::new(&txn)
            .append(tender_id, actor.id, ApprovalStatus::Approved, comments, now)
            .await?;
        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Close,
                "Tender",
                tender_id,
                format!("Tender {} closed", updated.reference_number),
                now,
            )
            .await?;
        txn.commit().await?;

        self.notify_status_change(&updated, "tender_closed").await;

        Ok(updated)
    }

    /// Submit a draft tender into the linear review queue (linear mode).
    pub async fn submit_for_review(
        &self,
        tender_id: Uuid,
        actor: Actor,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::SubmitForReview) {
            return Err(WorkflowError::Unauthorized(
                "only the bd team may submit tenders for review".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let tender = TenderRepository::new(&txn).get(tender_id).await?;

        let updated = self
            .transition(&txn, &tender, TenderStatus::InReview, now)
            .await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Submit,
                "Tender",
                tender_id,
                format!("Tender {} submitted for review", updated.reference_number),
                now,
            )
            .await?;
        txn.commit().await?;

        self.notify_status_change(&updated, "tender_submitted_for_review")
            .await;

        Ok(updated)
    }

    /// Approve a tender in the linear review queue (linear mode).
    pub async fn approve(
        &self,
        tender_id: Uuid,
        actor: Actor,
        comments: Option<String>,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::ApproveTender) {
            return Err(WorkflowError::Unauthorized(
                "only a manager may approve a tender".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let tender = TenderRepository::new(&txn).get(tender_id).await?;

        let updated = self
            .transition(&txn, &tender, TenderStatus::Approved, now)
            .await?;

        ApprovalRepository::new(&txn)
            .append(tender_id, actor.id, ApprovalStatus::Approved, comments, now)
            .await?;
        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Approve,
                "Tender",
                tender_id,
                format!("Tender {} approved", updated.reference_number),
                now,
            )
            .await?;
        txn.commit().await?;

        self.notify_status_change(&updated, "tender_approved").await;

        Ok(updated)
    }

    /// Mark an approved tender as submitted to the buyer (linear mode).
    pub async fn submit(
        &self,
        tender_id: Uuid,
        actor: Actor,
    ) -> Result<tender::Model, WorkflowError> {
        if !authorize(actor.role, Operation::SubmitTender) {
            return Err(WorkflowError::Unauthorized(
                "only a manager may submit a tender".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let tender = TenderRepository::new(&txn).get(tender_id).await?;

        let updated = self
            .transition(&txn, &tender, TenderStatus::Submitted, now)
            .await?;

        AuditLogRepository::new(&txn)
            .record(
                actor.id,
                AuditAction::Submit,
                "Tender",
                tender_id,
                format!("Tender {} submitted", updated.reference_number),
                now,
            )
            .await?;
        txn.commit().await?;

        self.notify_status_change(&updated, "tender_submitted").await;

        Ok(updated)
    }

    /// Fetch a tender by id.
    pub async fn get_tender(&self, tender_id: Uuid) -> Result<tender::Model, WorkflowError> {
        TenderRepository::new(&self.db).get(tender_id).await
    }

    /// Fetch a tender by its reference number.
    pub async fn get_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<tender::Model, WorkflowError> {
        TenderRepository::new(&self.db)
            .find_by_reference(reference_number)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("tender".to_string()))
    }

    /// Tender detail with timeline and derived assigned users.
    pub async fn get_detail(&self, tender_id: Uuid) -> Result<TenderDetail, WorkflowError> {
        let tender = TenderRepository::new(&self.db).get(tender_id).await?;
        let now = self.clock.now();

        let timeline = Some(timeline::get_or_create(&self.db, &tender, now).await?);
        let active_assignment = assignment::current(&self.db, tender_id).await?;
        let assigned_users =
            assignment::assigned_users(&self.db, tender_id, tender.required_department_id).await?;

        Ok(TenderDetail {
            tender,
            timeline,
            active_assignment,
            assigned_users,
        })
    }

    /// Approval history for a tender, newest first.
    pub async fn approval_history(
        &self,
        tender_id: Uuid,
    ) -> Result<Vec<approval::Model>, WorkflowError> {
        TenderRepository::new(&self.db).get(tender_id).await?;
        ApprovalRepository::new(&self.db)
            .list_by_tender(tender_id)
            .await
    }

    /// Audit trail for a tender, newest first.
    pub async fn audit_history(
        &self,
        tender_id: Uuid,
    ) -> Result<Vec<audit_log::Model>, WorkflowError> {
        TenderRepository::new(&self.db).get(tender_id).await?;
        AuditLogRepository::new(&self.db)
            .list_by_target("Tender", tender_id)
            .await
    }

    /// Manager assignment history for a tender, newest first.
    pub async fn assignment_history(
        &self,
        tender_id: Uuid,
    ) -> Result<Vec<manager_assignment::Model>, WorkflowError> {
        TenderRepository::new(&self.db).get(tender_id).await?;
        assignment::history(&self.db, tender_id).await
    }

    /// Document metadata for a tender, newest first.
    pub async fn documents(
        &self,
        tender_id: Uuid,
    ) -> Result<Vec<document::Model>, WorkflowError> {
        TenderRepository::new(&self.db).get(tender_id).await?;
        DocumentRepository::new(&self.db)
            .list_by_tender(tender_id)
            .await
    }

    /// Tenders currently in a given status.
    pub async fn list_by_status(
        &self,
        status: TenderStatus,
    ) -> Result<Vec<tender::Model>, WorkflowError> {
        TenderRepository::new(&self.db).list_by_status(status).await
    }

    /// All tenders regardless of status.
    pub async fn list_all(&self) -> Result<Vec<tender::Model>, WorkflowError> {
        TenderRepository::new(&self.db).list_all().await
    }

    /// Verify the edge against the active transition table. Operations with
    /// data preconditions run this first, so an illegal edge is reported as
    /// `InvalidTransition` rather than a precondition failure.
    fn check_edge(
        &self,
        tender: &tender::Model,
        to: TenderStatus,
    ) -> Result<(), WorkflowError> {
        let from: TenderStatus = tender
            .status
            .parse()
            .map_err(WorkflowError::InvalidArgument)?;

        if !self.mode.allows(from, to) {
            return Err(WorkflowError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Check the edge against the transition table, flip the status through
    /// the guarded update, and apply the status-driven timeline dates.
    async fn transition<C: ConnectionTrait>(
        &self,
        conn: &C,
        tender: &tender::Model,
        to: TenderStatus,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<tender::Model, WorkflowError> {
        let from: TenderStatus = tender
            .status
            .parse()
            .map_err(WorkflowError::InvalidArgument)?;

        if !self.mode.allows(from, to) {
            return Err(WorkflowError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let updated = TenderRepository::new(conn)
            .update_status_guarded(tender.id, from, to, now)
            .await?;

        let current = timeline::get_or_create(conn, &updated, now).await?;
        timeline::apply_status_dates(conn, current, to, now).await?;

        tracing::info!(
            tender_id = %updated.id,
            from = %from,
            to = %to,
            "Tender transitioned"
        );

        Ok(updated)
    }

    /// Tell the tender creator about a status change, after commit.
    async fn notify_status_change(&self, tender: &tender::Model, template: &str) {
        notify::dispatch(
            self.notifier.as_ref(),
            Notification {
                recipient_id: tender.created_by,
                template: template.to_string(),
                params: serde_json::json!({
                    "tender_reference": tender.reference_number,
                    "status": tender.status,
                }),
            },
        )
        .await;
    }
}
