//! # History API Handlers
//!
//! Read-only endpoints over the append-only records: approval decisions,
//! the audit trail, and manager assignment history.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{approval, audit_log, manager_assignment};
use crate::server::AppState;
use crate::workflow::Actor;

/// Approval decision record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApprovalDto {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub approver_id: Uuid,
    /// pending, approved, or rejected
    pub status: String,
    pub comments: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<approval::Model> for ApprovalDto {
    fn from(model: approval::Model) -> Self {
        Self {
            id: model.id,
            tender_id: model.tender_id,
            approver_id: model.approver_id,
            status: model.status,
            comments: model.comments,
            created_at: model.created_at,
        }
    }
}

/// Audit trail entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogDto {
    pub id: Uuid,
    /// Acting user; absent when the account has since been deleted
    pub user_id: Option<Uuid>,
    pub action: String,
    pub target_type: String,
    pub target_id: Uuid,
    pub details: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<audit_log::Model> for AuditLogDto {
    fn from(model: audit_log::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            target_type: model.target_type,
            target_id: model.target_id,
            details: model.details,
            created_at: model.created_at,
        }
    }
}

/// Manager assignment record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentDto {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub manager_id: Uuid,
    pub assigned_by: Uuid,
    pub is_active: bool,
    pub assigned_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<manager_assignment::Model> for AssignmentDto {
    fn from(model: manager_assignment::Model) -> Self {
        Self {
            id: model.id,
            tender_id: model.tender_id,
            manager_id: model.manager_id,
            assigned_by: model.assigned_by,
            is_active: model.is_active,
            assigned_at: model.assigned_at,
        }
    }
}

/// Approval history for a tender, newest first
#[utoipa::path(
    get,
    path = "/api/v1/tenders/{id}/approvals",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Approval records", body = [ApprovalDto]),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "history"
)]
pub async fn list_approvals(
    State(state): State<AppState>,
    _actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<Vec<ApprovalDto>>, ApiError> {
    let approvals = state.workflow.approval_history(tender_id).await?;
    Ok(Json(approvals.into_iter().map(ApprovalDto::from).collect()))
}

/// Audit trail for a tender, newest first
#[utoipa::path(
    get,
    path = "/api/v1/tenders/{id}/audit-log",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Audit entries", body = [AuditLogDto]),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "history"
)]
pub async fn list_audit_log(
    State(state): State<AppState>,
    _actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<Vec<AuditLogDto>>, ApiError> {
    let entries = state.workflow.audit_history(tender_id).await?;
    Ok(Json(entries.into_iter().map(AuditLogDto::from).collect()))
}

/// Manager assignment history for a tender, newest first
#[utoipa::path(
    get,
    path = "/api/v1/tenders/{id}/assignments",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Assignment records", body = [AssignmentDto]),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "history"
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    _actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentDto>>, ApiError> {
    let assignments = state.workflow.assignment_history(tender_id).await?;
    Ok(Json(
        assignments.into_iter().map(AssignmentDto::from).collect(),
    ))
}
