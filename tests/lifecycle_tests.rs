//! Integration tests for the tender lifecycle: status transitions, role
//! checks, the superuser gate, manager assignment, timelines, and the
//! approval and audit records.

mod common;

use chrono::Days;
use regex::Regex;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use common::TestContext;
use tenders::error::WorkflowError;
use tenders::models::manager_assignment;
use tenders::repositories::{NewChecklistItem, TenderRepository};
use tenders::workflow::{TenderStatus, WorkflowMode, assignment};

#[tokio::test]
async fn test_create_tender_starts_in_draft_with_reference() {
    let ctx = TestContext::new().await;

    let tender = ctx.create_draft().await;

    assert_eq!(tender.status, "draft");
    let pattern = Regex::new(r"^BTD-20250601-[0-9A-F]{6}$").unwrap();
    assert!(
        pattern.is_match(&tender.reference_number),
        "bad reference: {}",
        tender.reference_number
    );

    let audit = ctx.workflow.audit_history(tender.id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "create");
    assert_eq!(audit[0].user_id, Some(ctx.bd.id));
}

#[tokio::test]
async fn test_create_rejects_negative_budget() {
    let ctx = TestContext::new().await;

    let mut fields = ctx.new_tender_fields();
    fields.budget = "-1.00".parse().unwrap();

    let err = ctx.workflow.create(ctx.bd, fields).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_only_bd_team_may_create() {
    let ctx = TestContext::new().await;

    let err = ctx
        .workflow
        .create(ctx.manager, ctx.new_tender_fields())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized(_)));
}

#[tokio::test]
async fn test_submit_requires_spec_document() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;

    let err = ctx
        .workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PreconditionFailed(_)));

    // Rejected submission leaves the tender untouched
    let unchanged = ctx.workflow.get_tender(tender.id).await.unwrap();
    assert_eq!(unchanged.status, "draft");

    // Attaching the spec unblocks the same call
    ctx.attach_spec(tender.id).await;
    let updated = ctx
        .workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap();
    assert_eq!(updated.status, "pending_superuser_approval");
}

#[tokio::test]
async fn test_superuser_approval_assigns_manager() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;
    ctx.attach_spec(tender.id).await;
    ctx.workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap();

    let updated = ctx
        .workflow
        .superuser_review(
            tender.id,
            ctx.superuser,
            "approve",
            Some("looks solid".to_string()),
            Some(ctx.manager.id),
        )
        .await
        .unwrap();

    assert_eq!(updated.status, "in_progress");

    let active = assignment::current(&ctx.db, tender.id).await.unwrap().unwrap();
    assert_eq!(active.manager_id, ctx.manager.id);
    assert_eq!(active.assigned_by, ctx.superuser.id);

    let approvals = ctx.workflow.approval_history(tender.id).await.unwrap();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].status, "approved");
    assert_eq!(approvals[0].comments.as_deref(), Some("looks solid"));
}

#[tokio::test]
async fn test_superuser_rejection_is_terminal() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;
    ctx.attach_spec(tender.id).await;
    ctx.workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap();

    let updated = ctx
        .workflow
        .superuser_review(tender.id, ctx.superuser, "reject", None, None)
        .await
        .unwrap();
    assert_eq!(updated.status, "rejected");

    // No edge leaves the rejected status
    let err = ctx
        .workflow
        .submit_to_final_review(tender.id, ctx.manager)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_superuser_review_validates_input() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;
    ctx.attach_spec(tender.id).await;
    ctx.workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap();

    // Unknown decision
    let err = ctx
        .workflow
        .superuser_review(tender.id, ctx.superuser, "defer", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));

    // Approving without a manager
    let err = ctx
        .workflow
        .superuser_review(tender.id, ctx.superuser, "approve", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));

    // Approving with a non-manager user
    let err = ctx
        .workflow
        .superuser_review(tender.id, ctx.superuser, "approve", None, Some(ctx.bd.id))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));

    // Only superusers review
    let err = ctx
        .workflow
        .superuser_review(tender.id, ctx.manager, "approve", None, Some(ctx.manager.id))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized(_)));

    // All of the failures left the tender where it was
    let unchanged = ctx.workflow.get_tender(tender.id).await.unwrap();
    assert_eq!(unchanged.status, "pending_superuser_approval");
}

#[tokio::test]
async fn test_final_review_gated_on_checklist_completion() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    ctx.checklist
        .create_batch(
            tender.id,
            ctx.manager,
            vec![
                NewChecklistItem {
                    name: "Compliance certificates".to_string(),
                    description: None,
                    assignee_id: Some(ctx.bd.id),
                    deadline: None,
                },
                NewChecklistItem {
                    name: "Financial statements".to_string(),
                    description: None,
                    assignee_id: None,
                    deadline: None,
                },
            ],
        )
        .await
        .unwrap();

    let err = ctx
        .workflow
        .submit_to_final_review(tender.id, ctx.manager)
        .await
        .unwrap_err();
    match err {
        WorkflowError::PreconditionFailed(msg) => {
            assert!(msg.contains("Compliance certificates"));
            assert!(msg.contains("Financial statements"));
        }
        other => panic!("expected PreconditionFailed, got {other:?}"),
    }

    // Complete both items and retry
    let items = ctx.checklist.list_items(tender.id).await.unwrap();
    for item in &items {
        ctx.checklist
            .complete_item(item.id, ctx.manager, None)
            .await
            .unwrap();
    }

    let updated = ctx
        .workflow
        .submit_to_final_review(tender.id, ctx.manager)
        .await
        .unwrap();
    assert_eq!(updated.status, "pending_final_approval");
}

#[tokio::test]
async fn test_award_and_close() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;
    ctx.workflow
        .submit_to_final_review(tender.id, ctx.manager)
        .await
        .unwrap();

    let awarded = ctx
        .workflow
        .award(tender.id, ctx.manager, Some("won".to_string()))
        .await
        .unwrap();
    assert_eq!(awarded.status, "awarded");

    let closed = ctx
        .workflow
        .close(tender.id, ctx.manager, None)
        .await
        .unwrap();
    assert_eq!(closed.status, "closed");

    // One approval for the superuser gate, one each for award and close
    let approvals = ctx.workflow.approval_history(tender.id).await.unwrap();
    assert_eq!(approvals.len(), 3);
}

#[tokio::test]
async fn test_illegal_edges_are_rejected() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;

    // draft -> awarded is not in the managed table
    let err = ctx
        .workflow
        .award(tender.id, ctx.manager, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    // Linear edges are unreachable in managed mode
    let err = ctx
        .workflow
        .submit_for_review(tender.id, ctx.bd)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_guarded_update_detects_concurrent_transition() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;
    ctx.attach_spec(tender.id).await;
    ctx.workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap();

    // A second writer that still believes the tender is in draft loses
    let repo = TenderRepository::new(&ctx.db);
    let err = repo
        .update_status_guarded(
            tender.id,
            TenderStatus::Draft,
            TenderStatus::PendingSuperuserApproval,
            common::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::ConflictRetryable(_)));
}

#[tokio::test]
async fn test_reassignment_keeps_single_active_row() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    assignment::assign(
        &ctx.db,
        tender.id,
        ctx.second_manager.id,
        ctx.superuser.id,
        common::now(),
    )
    .await
    .unwrap();

    let active = assignment::current(&ctx.db, tender.id).await.unwrap().unwrap();
    assert_eq!(active.manager_id, ctx.second_manager.id);

    let history = assignment::history(&ctx.db, tender.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|a| a.is_active).count(), 1);
}

#[tokio::test]
async fn test_second_active_assignment_trips_unique_index() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    // A racing writer that skipped the deactivate step hits the partial
    // unique index on (tender_id) WHERE is_active
    let racing = manager_assignment::ActiveModel {
        id: Set(Uuid::new_v4()),
        tender_id: Set(tender.id),
        manager_id: Set(ctx.second_manager.id),
        assigned_by: Set(ctx.superuser.id),
        is_active: Set(true),
        assigned_at: Set(common::now()),
    };
    let db_err = racing.insert(&ctx.db).await.unwrap_err();
    let err = WorkflowError::from_db(db_err, "another manager assignment won concurrently");
    assert!(matches!(err, WorkflowError::ConflictRetryable(_)));

    // The original assignment is untouched and still the only active row
    let history = assignment::history(&ctx.db, tender.id).await.unwrap();
    assert_eq!(history.iter().filter(|a| a.is_active).count(), 1);
    let active = assignment::current(&ctx.db, tender.id).await.unwrap().unwrap();
    assert_eq!(active.manager_id, ctx.manager.id);

    // Inactive rows fall outside the index and insert fine
    manager_assignment::ActiveModel {
        id: Set(Uuid::new_v4()),
        tender_id: Set(tender.id),
        manager_id: Set(ctx.second_manager.id),
        assigned_by: Set(ctx.superuser.id),
        is_active: Set(false),
        assigned_at: Set(common::now()),
    }
    .insert(&ctx.db)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_assigned_users_derived_from_assignment_and_department() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let detail = ctx.workflow.get_detail(tender.id).await.unwrap();

    // Active manager first, then department managers without duplicates
    assert_eq!(detail.assigned_users[0], ctx.manager.id);
    assert!(detail.assigned_users.contains(&ctx.second_manager.id));
    let unique: std::collections::HashSet<Uuid> =
        detail.assigned_users.iter().copied().collect();
    assert_eq!(unique.len(), detail.assigned_users.len());
}

#[tokio::test]
async fn test_timeline_defaults_derive_from_deadline() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;

    let detail = ctx.workflow.get_detail(tender.id).await.unwrap();
    let timeline = detail.timeline.unwrap();

    let deadline = common::deadline();
    assert_eq!(timeline.submission_start, Some(tender.created_at));
    assert_eq!(timeline.submission_end, Some(deadline));
    assert_eq!(
        timeline.evaluation_start,
        deadline.checked_add_days(Days::new(1))
    );
    assert_eq!(
        timeline.evaluation_end,
        deadline.checked_add_days(Days::new(14))
    );
    assert_eq!(timeline.award_date, deadline.checked_add_days(Days::new(21)));
    assert_eq!(
        timeline.project_start_date,
        deadline.checked_add_days(Days::new(30))
    );
    assert_eq!(
        timeline.project_end_date,
        deadline.checked_add_days(Days::new(90))
    );
}

#[tokio::test]
async fn test_timeline_updates_only_fill_absent_fields() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;

    // Timeline created with full defaults; transitions must not overwrite
    let before = ctx.workflow.get_detail(tender.id).await.unwrap();
    ctx.attach_spec(tender.id).await;
    ctx.workflow
        .submit_for_superuser_review(tender.id, ctx.bd)
        .await
        .unwrap();
    let after = ctx.workflow.get_detail(tender.id).await.unwrap();

    let before = before.timeline.unwrap();
    let after = after.timeline.unwrap();
    assert_eq!(before.submission_end, after.submission_end);
    assert_eq!(before.evaluation_start, after.evaluation_start);
}

#[tokio::test]
async fn test_audit_trail_records_every_operation() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;
    ctx.workflow
        .submit_to_final_review(tender.id, ctx.manager)
        .await
        .unwrap();
    ctx.workflow.award(tender.id, ctx.manager, None).await.unwrap();
    ctx.workflow.close(tender.id, ctx.manager, None).await.unwrap();

    let audit = ctx.workflow.audit_history(tender.id).await.unwrap();
    let mut actions: Vec<&str> = audit.iter().map(|e| e.action.as_str()).collect();
    actions.sort_unstable();
    assert_eq!(
        actions,
        vec!["approve", "award", "close", "create", "submit", "submit"]
    );
    assert!(audit.iter().all(|e| e.target_type == "Tender"));
}

#[tokio::test]
async fn test_illegal_edge_reported_before_preconditions() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_draft().await;

    ctx.checklist
        .create_batch(
            tender.id,
            ctx.manager,
            vec![NewChecklistItem {
                name: "Compliance certificates".to_string(),
                description: None,
                assignee_id: None,
                deadline: None,
            }],
        )
        .await
        .unwrap();

    // draft -> pending_final_approval is not an edge; the open checklist
    // item must not turn that into a precondition failure
    let err = ctx
        .workflow
        .submit_to_final_review(tender.id, ctx.manager)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    // Same precedence at the superuser gate: in linear mode the edge does
    // not exist, and the missing spec document is not what gets reported
    let linear = TestContext::with_mode(WorkflowMode::Linear).await;
    let tender = linear.create_draft().await;
    let err = linear
        .workflow
        .submit_for_superuser_review(tender.id, linear.bd)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_linear_mode_runs_the_legacy_path() {
    let ctx = TestContext::with_mode(WorkflowMode::Linear).await;
    let tender = ctx.create_draft().await;

    // No spec document required on the legacy path
    let tender = ctx
        .workflow
        .submit_for_review(tender.id, ctx.bd)
        .await
        .unwrap();
    assert_eq!(tender.status, "in_review");

    let tender = ctx
        .workflow
        .approve(tender.id, ctx.manager, None)
        .await
        .unwrap();
    assert_eq!(tender.status, "approved");

    let tender = ctx.workflow.submit(tender.id, ctx.manager).await.unwrap();
    assert_eq!(tender.status, "submitted");

    let tender = ctx.workflow.award(tender.id, ctx.manager, None).await.unwrap();
    assert_eq!(tender.status, "awarded");

    let tender = ctx.workflow.close(tender.id, ctx.manager, None).await.unwrap();
    assert_eq!(tender.status, "closed");

    // Managed-path operations are illegal edges here
    let other = ctx.create_draft().await;
    ctx.attach_spec(other.id).await;
    let err = ctx
        .workflow
        .submit_for_superuser_review(other.id, ctx.bd)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}
