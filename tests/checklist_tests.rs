//! Integration tests for the checklist engine: batch creation, the item
//! state machine, and assignee/manager authorization.

mod common;

use common::TestContext;
use tenders::error::WorkflowError;
use tenders::repositories::NewChecklistItem;
use tenders::workflow::Role;

fn item(name: &str) -> NewChecklistItem {
    NewChecklistItem {
        name: name.to_string(),
        description: None,
        assignee_id: None,
        deadline: None,
    }
}

#[tokio::test]
async fn test_batch_creation_defaults_assignee_to_creator() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let created = ctx
        .checklist
        .create_batch(
            tender.id,
            ctx.manager,
            vec![item("Site survey"), item("Bid bond")],
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    for entry in &created {
        assert_eq!(entry.status, "pending");
        assert_eq!(entry.assignee_id, tender.created_by);
    }
}

#[tokio::test]
async fn test_batch_is_all_or_nothing() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let err = ctx
        .checklist
        .create_batch(
            tender.id,
            ctx.manager,
            vec![item("Valid item"), item("   ")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));

    // The valid item was not persisted either
    let items = ctx.checklist.list_items(tender.id).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_batch_rejects_unknown_assignee() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let err = ctx
        .checklist
        .create_batch(
            tender.id,
            ctx.manager,
            vec![NewChecklistItem {
                name: "Orphan item".to_string(),
                description: None,
                assignee_id: Some(uuid::Uuid::new_v4()),
                deadline: None,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[tokio::test]
async fn test_only_managers_create_checklists() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let err = ctx
        .checklist
        .create_batch(tender.id, ctx.bd, vec![item("Site survey")])
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized(_)));
}

#[tokio::test]
async fn test_assignee_completes_own_item() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let created = ctx
        .checklist
        .create_batch(tender.id, ctx.manager, vec![item("Site survey")])
        .await
        .unwrap();
    let item_id = created[0].id;

    // Assignee is the tender creator (bd team)
    let completed = ctx
        .checklist
        .complete_item(item_id, ctx.bd, Some("done on site".to_string()))
        .await
        .unwrap();
    assert_eq!(completed.status, "completed");
    assert_eq!(completed.completed_at, Some(common::now()));

    // Completing twice fails
    let err = ctx
        .checklist
        .complete_item(item_id, ctx.bd, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PreconditionFailed(_)));
}

#[tokio::test]
async fn test_unrelated_user_cannot_touch_item() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;
    let outsider = common::seed_user(&ctx.db, Role::BdTeam, None, ctx.company_id).await;

    let created = ctx
        .checklist
        .create_batch(tender.id, ctx.manager, vec![item("Site survey")])
        .await
        .unwrap();

    let err = ctx
        .checklist
        .complete_item(created[0].id, outsider, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized(_)));
}

#[tokio::test]
async fn test_undo_requires_completed_item() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let created = ctx
        .checklist
        .create_batch(tender.id, ctx.manager, vec![item("Site survey")])
        .await
        .unwrap();
    let item_id = created[0].id;

    // Undo on a pending item fails
    let err = ctx
        .checklist
        .undo_completion(item_id, ctx.manager, "mistake".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PreconditionFailed(_)));

    ctx.checklist
        .complete_item(item_id, ctx.manager, None)
        .await
        .unwrap();

    let undone = ctx
        .checklist
        .undo_completion(item_id, ctx.manager, "wrong document version".to_string())
        .await
        .unwrap();
    assert_eq!(undone.status, "pending");
    assert_eq!(undone.completed_at, None);
    assert!(
        undone
            .comments
            .as_deref()
            .unwrap()
            .contains("wrong document version")
    );
}

#[tokio::test]
async fn test_review_cycle() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let created = ctx
        .checklist
        .create_batch(tender.id, ctx.manager, vec![item("Site survey")])
        .await
        .unwrap();
    let item_id = created[0].id;

    // Assignee hands the item to the manager
    let pending = ctx
        .checklist
        .submit_item_for_review(item_id, ctx.bd, None)
        .await
        .unwrap();
    assert_eq!(pending.status, "pending_review");

    // Rejection sends it back for revision
    let revised = ctx
        .checklist
        .review_item(item_id, ctx.manager, "reject", Some("wrong scale".to_string()))
        .await
        .unwrap();
    assert_eq!(revised.status, "revision_needed");
    assert_eq!(revised.reviewed_by, Some(ctx.manager.id));
    assert_eq!(revised.review_comments.as_deref(), Some("wrong scale"));

    // Resubmission and approval completes the item
    ctx.checklist
        .submit_item_for_review(item_id, ctx.bd, None)
        .await
        .unwrap();
    let approved = ctx
        .checklist
        .review_item(item_id, ctx.manager, "approve", None)
        .await
        .unwrap();
    assert_eq!(approved.status, "completed");
    assert_eq!(approved.completed_at, Some(common::now()));
}

#[tokio::test]
async fn test_review_guards() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let created = ctx
        .checklist
        .create_batch(tender.id, ctx.manager, vec![item("Site survey")])
        .await
        .unwrap();
    let item_id = created[0].id;

    // Reviewing an item that is not pending_review fails
    let err = ctx
        .checklist
        .review_item(item_id, ctx.manager, "approve", None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PreconditionFailed(_)));

    ctx.checklist
        .submit_item_for_review(item_id, ctx.bd, None)
        .await
        .unwrap();

    // Unknown decision
    let err = ctx
        .checklist
        .review_item(item_id, ctx.manager, "maybe", None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));

    // Non-managers do not review
    let err = ctx
        .checklist
        .review_item(item_id, ctx.bd, "approve", None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized(_)));
}

#[tokio::test]
async fn test_status_summary_counts_by_status() {
    let ctx = TestContext::new().await;
    let tender = ctx.create_in_progress().await;

    let created = ctx
        .checklist
        .create_batch(
            tender.id,
            ctx.manager,
            vec![item("A"), item("B"), item("C")],
        )
        .await
        .unwrap();
    ctx.checklist
        .complete_item(created[0].id, ctx.manager, None)
        .await
        .unwrap();
    ctx.checklist
        .submit_item_for_review(created[1].id, ctx.bd, None)
        .await
        .unwrap();

    let summary = ctx.checklist.status_summary(tender.id).await.unwrap();
    assert_eq!(summary.get("completed"), Some(&1));
    assert_eq!(summary.get("pending_review"), Some(&1));
    assert_eq!(summary.get("pending"), Some(&1));
}
