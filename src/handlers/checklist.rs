//! # Checklist API Handlers
//!
//! Batch checklist creation for a tender and the per-item completion,
//! undo, resubmission, and review endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::checklist_item;
use crate::repositories::NewChecklistItem;
use crate::server::AppState;
use crate::workflow::Actor;

/// One item of a checklist creation batch
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChecklistItemRequestDto {
    /// Item name (required)
    #[schema(example = "Collect compliance certificates")]
    pub name: String,
    pub description: Option<String>,
    /// Assignee; defaults to the tender creator when omitted
    pub assignee_id: Option<Uuid>,
    pub deadline: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Request payload for batch checklist creation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateChecklistRequestDto {
    pub items: Vec<ChecklistItemRequestDto>,
}

/// Checklist item representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChecklistItemDto {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub assignee_id: Uuid,
    pub deadline: Option<chrono::DateTime<chrono::FixedOffset>>,
    /// pending, pending_review, completed, or revision_needed
    #[schema(example = "pending")]
    pub status: String,
    pub comments: Option<String>,
    pub review_comments: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub completed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub reviewed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl From<checklist_item::Model> for ChecklistItemDto {
    fn from(model: checklist_item::Model) -> Self {
        Self {
            id: model.id,
            tender_id: model.tender_id,
            name: model.name,
            description: model.description,
            assignee_id: model.assignee_id,
            deadline: model.deadline,
            status: model.status,
            comments: model.comments,
            review_comments: model.review_comments,
            reviewed_by: model.reviewed_by,
            completed_at: model.completed_at,
            reviewed_at: model.reviewed_at,
        }
    }
}

/// Optional comments payload for item endpoints
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemCommentsDto {
    pub comments: Option<String>,
}

/// Payload for undoing a completed item
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UndoRequestDto {
    /// Why the completion is being reverted; appended to the item comments
    pub reason: String,
}

/// Review decision payload for an item awaiting review
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemReviewRequestDto {
    /// "approve" or "reject"
    #[schema(example = "approve")]
    pub decision: String,
    pub comments: Option<String>,
}

/// Create a checklist for a tender
///
/// The whole batch is validated first; one invalid item rejects all of
/// them.
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/checklist",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = CreateChecklistRequestDto,
    responses(
        (status = 201, description = "Checklist created", body = [ChecklistItemDto]),
        (status = 400, description = "Invalid item in batch", body = ApiError),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 404, description = "Tender or assignee not found", body = ApiError)
    ),
    tag = "checklist"
)]
pub async fn create_checklist(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
    Json(request): Json<CreateChecklistRequestDto>,
) -> Result<(StatusCode, Json<Vec<ChecklistItemDto>>), ApiError> {
    let items = request
        .items
        .into_iter()
        .map(|item| NewChecklistItem {
            name: item.name,
            description: item.description,
            assignee_id: item.assignee_id,
            deadline: item.deadline,
        })
        .collect();

    let created = state.checklist.create_batch(tender_id, actor, items).await?;

    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(ChecklistItemDto::from).collect()),
    ))
}

/// List checklist items for a tender
#[utoipa::path(
    get,
    path = "/api/v1/tenders/{id}/checklist",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Checklist items", body = [ChecklistItemDto])
    ),
    tag = "checklist"
)]
pub async fn list_checklist(
    State(state): State<AppState>,
    _actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<Vec<ChecklistItemDto>>, ApiError> {
    let items = state.checklist.list_items(tender_id).await?;
    Ok(Json(items.into_iter().map(ChecklistItemDto::from).collect()))
}

/// Per-status item counts for a tender's checklist
#[utoipa::path(
    get,
    path = "/api/v1/tenders/{id}/checklist/summary",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Counts keyed by item status")
    ),
    tag = "checklist"
)]
pub async fn checklist_summary(
    State(state): State<AppState>,
    _actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<BTreeMap<String, u64>>, ApiError> {
    let summary = state.checklist.status_summary(tender_id).await?;
    Ok(Json(summary))
}

/// Mark a checklist item completed
#[utoipa::path(
    post,
    path = "/api/v1/checklist-items/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Checklist item UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = ItemCommentsDto,
    responses(
        (status = 200, description = "Item completed", body = ChecklistItemDto),
        (status = 403, description = "Not the assignee or a manager", body = ApiError),
        (status = 422, description = "Item already completed", body = ApiError)
    ),
    tag = "checklist"
)]
pub async fn complete_item(
    State(state): State<AppState>,
    actor: Actor,
    Path(item_id): Path<Uuid>,
    Json(request): Json<ItemCommentsDto>,
) -> Result<Json<ChecklistItemDto>, ApiError> {
    let updated = state
        .checklist
        .complete_item(item_id, actor, request.comments)
        .await?;
    Ok(Json(updated.into()))
}

/// Revert a completed checklist item to pending
#[utoipa::path(
    post,
    path = "/api/v1/checklist-items/{id}/undo",
    params(
        ("id" = Uuid, Path, description = "Checklist item UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = UndoRequestDto,
    responses(
        (status = 200, description = "Completion undone", body = ChecklistItemDto),
        (status = 403, description = "Not the assignee or a manager", body = ApiError),
        (status = 422, description = "Item is not completed", body = ApiError)
    ),
    tag = "checklist"
)]
pub async fn undo_item(
    State(state): State<AppState>,
    actor: Actor,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UndoRequestDto>,
) -> Result<Json<ChecklistItemDto>, ApiError> {
    let updated = state
        .checklist
        .undo_completion(item_id, actor, request.reason)
        .await?;
    Ok(Json(updated.into()))
}

/// Submit a checklist item for manager review
#[utoipa::path(
    post,
    path = "/api/v1/checklist-items/{id}/submit-review",
    params(
        ("id" = Uuid, Path, description = "Checklist item UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = ItemCommentsDto,
    responses(
        (status = 200, description = "Item awaiting review", body = ChecklistItemDto),
        (status = 403, description = "Not the assignee or a manager", body = ApiError),
        (status = 422, description = "Item cannot be submitted from its current status", body = ApiError)
    ),
    tag = "checklist"
)]
pub async fn submit_item_for_review(
    State(state): State<AppState>,
    actor: Actor,
    Path(item_id): Path<Uuid>,
    Json(request): Json<ItemCommentsDto>,
) -> Result<Json<ChecklistItemDto>, ApiError> {
    let updated = state
        .checklist
        .submit_item_for_review(item_id, actor, request.comments)
        .await?;
    Ok(Json(updated.into()))
}

/// Record a manager's review decision on an item
#[utoipa::path(
    post,
    path = "/api/v1/checklist-items/{id}/review",
    params(
        ("id" = Uuid, Path, description = "Checklist item UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = ItemReviewRequestDto,
    responses(
        (status = 200, description = "Decision recorded", body = ChecklistItemDto),
        (status = 400, description = "Unknown decision", body = ApiError),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 422, description = "Item is not awaiting review", body = ApiError)
    ),
    tag = "checklist"
)]
pub async fn review_item(
    State(state): State<AppState>,
    actor: Actor,
    Path(item_id): Path<Uuid>,
    Json(request): Json<ItemReviewRequestDto>,
) -> Result<Json<ChecklistItemDto>, ApiError> {
    let updated = state
        .checklist
        .review_item(item_id, actor, &request.decision, request.comments)
        .await?;
    Ok(Json(updated.into()))
}
