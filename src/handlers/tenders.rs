//! # Tender API Handlers
//!
//! Handlers for tender creation, reads, and lifecycle transitions. Thin
//! layer: parse the request, hand off to the lifecycle controller, map the
//! result into the response DTO.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::tender;
use crate::repositories::NewTender;
use crate::server::AppState;
use crate::workflow::lifecycle::TenderDetail;
use crate::workflow::{Actor, TenderStatus, WorkflowMode};

/// Request payload for creating a tender
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTenderRequestDto {
    /// Tender title (required)
    #[schema(example = "Road resurfacing, phase 2")]
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Budget amount as a decimal string
    #[schema(example = "250000.00")]
    pub budget: String,
    /// Submission deadline (ISO 8601)
    #[schema(example = "2025-07-01T17:00:00+00:00")]
    pub deadline: chrono::DateTime<chrono::FixedOffset>,
    /// Owning company
    pub company_id: Uuid,
    /// Department whose managers are responsible for execution
    pub required_department_id: Option<Uuid>,
    /// Tender category
    pub category_id: Option<Uuid>,
}

/// Tender representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenderDto {
    pub id: Uuid,
    /// Generated reference, e.g. BTD-20250601-9F2C4A
    #[schema(example = "BTD-20250601-9F2C4A")]
    pub reference_number: String,
    pub name: String,
    pub description: String,
    /// Budget amount as a decimal string
    pub budget: String,
    pub deadline: chrono::DateTime<chrono::FixedOffset>,
    /// Current workflow status token
    #[schema(example = "draft")]
    pub status: String,
    pub created_by: Uuid,
    pub company_id: Uuid,
    pub required_department_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<tender::Model> for TenderDto {
    fn from(model: tender::Model) -> Self {
        Self {
            id: model.id,
            reference_number: model.reference_number,
            name: model.name,
            description: model.description,
            budget: model.budget.to_string(),
            deadline: model.deadline,
            status: model.status,
            created_by: model.created_by,
            company_id: model.company_id,
            required_department_id: model.required_department_id,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Timeline milestones for a tender
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimelineDto {
    pub submission_start: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub submission_end: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub evaluation_start: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub evaluation_end: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub award_date: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub project_start_date: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub project_end_date: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Tender detail: the tender plus timeline and assignment read-model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenderDetailDto {
    #[serde(flatten)]
    pub tender: TenderDto,
    pub timeline: Option<TimelineDto>,
    /// Manager currently responsible, if one is assigned
    pub active_manager_id: Option<Uuid>,
    /// Active manager plus managers of the required department
    pub assigned_users: Vec<Uuid>,
}

impl From<TenderDetail> for TenderDetailDto {
    fn from(detail: TenderDetail) -> Self {
        Self {
            tender: detail.tender.into(),
            timeline: detail.timeline.map(|t| TimelineDto {
                submission_start: t.submission_start,
                submission_end: t.submission_end,
                evaluation_start: t.evaluation_start,
                evaluation_end: t.evaluation_end,
                award_date: t.award_date,
                project_start_date: t.project_start_date,
                project_end_date: t.project_end_date,
            }),
            active_manager_id: detail.active_assignment.map(|a| a.manager_id),
            assigned_users: detail.assigned_users,
        }
    }
}

/// Review decision payload for the superuser gate
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewRequestDto {
    /// "approve" or "reject"
    #[schema(example = "approve")]
    pub decision: String,
    /// Reviewer comments, recorded on the approval
    pub comments: Option<String>,
    /// Manager to assign; required when approving
    pub manager_id: Option<Uuid>,
}

/// Optional comments for decision endpoints
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CommentsDto {
    pub comments: Option<String>,
}

/// Status filter for tender listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Create a new tender in draft
#[utoipa::path(
    post,
    path = "/api/v1/tenders",
    params(crate::auth::ActorHeaders),
    request_body = CreateTenderRequestDto,
    responses(
        (status = 201, description = "Tender created", body = TenderDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Role not permitted", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn create_tender(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateTenderRequestDto>,
) -> Result<(StatusCode, [(&'static str, String); 1], Json<TenderDto>), ApiError> {
    let budget: Decimal = request.budget.parse().map_err(|_| {
        crate::error::validation_error(
            "Invalid budget",
            serde_json::json!({ "budget": "Must be a decimal number" }),
        )
    })?;

    let fields = NewTender {
        name: request.name,
        description: request.description,
        budget,
        deadline: request.deadline,
        company_id: request.company_id,
        required_department_id: request.required_department_id,
        category_id: request.category_id,
    };

    let created = state.workflow.create(actor, fields).await?;
    let location = format!("/api/v1/tenders/{}", created.id);

    Ok((
        StatusCode::CREATED,
        [("Location", location)],
        Json(created.into()),
    ))
}

/// Get a tender with its timeline and assignment detail
#[utoipa::path(
    get,
    path = "/api/v1/tenders/{id}",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Tender detail", body = TenderDetailDto),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn get_tender(
    State(state): State<AppState>,
    _actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<TenderDetailDto>, ApiError> {
    let detail = state.workflow.get_detail(tender_id).await?;
    Ok(Json(detail.into()))
}

/// Look up a tender by its reference number
#[utoipa::path(
    get,
    path = "/api/v1/tenders/by-reference/{reference}",
    params(
        ("reference" = String, Path, description = "Tender reference number, e.g. BTD-20250601-9F2C4A"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Tender", body = TenderDto),
        (status = 404, description = "No tender with that reference", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn get_tender_by_reference(
    State(state): State<AppState>,
    _actor: Actor,
    Path(reference): Path<String>,
) -> Result<Json<TenderDto>, ApiError> {
    let tender = state.workflow.get_by_reference(&reference).await?;
    Ok(Json(tender.into()))
}

/// List tenders, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/v1/tenders",
    params(
        ("status" = Option<String>, Query, description = "Filter by status token"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Tenders", body = [TenderDto]),
        (status = 400, description = "Unknown status token", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn list_tenders(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TenderDto>>, ApiError> {
    let status_filter = match query.status.as_deref() {
        Some(token) => Some(token.parse::<TenderStatus>().map_err(|_| {
            crate::error::validation_error(
                "Unknown status",
                serde_json::json!({ "status": format!("Unknown status token: {token}") }),
            )
        })?),
        None => None,
    };

    let tenders = match status_filter {
        Some(status) => state.workflow.list_by_status(status).await?,
        None => state.workflow.list_all().await?,
    };

    Ok(Json(tenders.into_iter().map(TenderDto::from).collect()))
}

/// Submit a draft tender for review
///
/// In managed mode this requires a spec document and moves the tender to
/// the superuser approval gate; in linear mode it moves to in_review.
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/submit-for-review",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Tender submitted", body = TenderDto),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 409, description = "Transition not allowed from current status", body = ApiError),
        (status = 422, description = "Missing spec document", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn submit_for_review(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<TenderDto>, ApiError> {
    let updated = match state.workflow.mode() {
        WorkflowMode::Managed => {
            state
                .workflow
                .submit_for_superuser_review(tender_id, actor)
                .await?
        }
        WorkflowMode::Linear => state.workflow.submit_for_review(tender_id, actor).await?,
    };
    Ok(Json(updated.into()))
}

/// Record the superuser's review decision
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/review",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = ReviewRequestDto,
    responses(
        (status = 200, description = "Decision recorded", body = TenderDto),
        (status = 400, description = "Unknown decision or missing manager_id", body = ApiError),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 409, description = "Transition not allowed from current status", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn review_tender(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
    Json(request): Json<ReviewRequestDto>,
) -> Result<Json<TenderDto>, ApiError> {
    let updated = state
        .workflow
        .superuser_review(
            tender_id,
            actor,
            &request.decision,
            request.comments,
            request.manager_id,
        )
        .await?;
    Ok(Json(updated.into()))
}

/// Approve a tender in the linear review queue
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = CommentsDto,
    responses(
        (status = 200, description = "Tender approved", body = TenderDto),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 409, description = "Transition not allowed from current status", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn approve_tender(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
    Json(request): Json<CommentsDto>,
) -> Result<Json<TenderDto>, ApiError> {
    let updated = state
        .workflow
        .approve(tender_id, actor, request.comments)
        .await?;
    Ok(Json(updated.into()))
}

/// Mark an approved tender as submitted to the buyer
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Tender submitted", body = TenderDto),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 409, description = "Transition not allowed from current status", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn submit_tender(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<TenderDto>, ApiError> {
    let updated = state.workflow.submit(tender_id, actor).await?;
    Ok(Json(updated.into()))
}

/// Move an in-progress tender to final review
///
/// Requires every checklist item to be completed.
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/final-review",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Tender submitted to final review", body = TenderDto),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 409, description = "Transition not allowed from current status", body = ApiError),
        (status = 422, description = "Checklist items incomplete", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn submit_to_final_review(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<TenderDto>, ApiError> {
    let updated = state.workflow.submit_to_final_review(tender_id, actor).await?;
    Ok(Json(updated.into()))
}

/// Mark a tender as awarded
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/award",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = CommentsDto,
    responses(
        (status = 200, description = "Tender awarded", body = TenderDto),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 409, description = "Transition not allowed from current status", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn award_tender(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
    Json(request): Json<CommentsDto>,
) -> Result<Json<TenderDto>, ApiError> {
    let updated = state
        .workflow
        .award(tender_id, actor, request.comments)
        .await?;
    Ok(Json(updated.into()))
}

/// Close a tender
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/close",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = CommentsDto,
    responses(
        (status = 200, description = "Tender closed", body = TenderDto),
        (status = 403, description = "Role not permitted", body = ApiError),
        (status = 409, description = "Transition not allowed from current status", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn close_tender(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
    Json(request): Json<CommentsDto>,
) -> Result<Json<TenderDto>, ApiError> {
    let updated = state
        .workflow
        .close(tender_id, actor, request.comments)
        .await?;
    Ok(Json(updated.into()))
}
