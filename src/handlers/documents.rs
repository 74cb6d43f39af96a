//! # Document API Handlers
//!
//! Document metadata endpoints. File bytes live in an external blob store;
//! the API records type, storage key, and uploader.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::document;
use crate::server::AppState;
use crate::workflow::Actor;

/// Request payload for attaching a document to a tender
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttachDocumentRequestDto {
    /// notice, spec, bid, contract, or other
    #[schema(example = "spec")]
    pub document_type: String,
    /// Key of the uploaded object in the blob store
    #[schema(example = "tenders/btd-20250601-9f2c4a/spec.pdf")]
    pub storage_key: String,
    pub description: Option<String>,
}

/// Document metadata returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentDto {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub uploader_id: Uuid,
    pub document_type: String,
    pub storage_key: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<document::Model> for DocumentDto {
    fn from(model: document::Model) -> Self {
        Self {
            id: model.id,
            tender_id: model.tender_id,
            uploader_id: model.uploader_id,
            document_type: model.document_type,
            storage_key: model.storage_key,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

/// Attach document metadata to a tender
#[utoipa::path(
    post,
    path = "/api/v1/tenders/{id}/documents",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    request_body = AttachDocumentRequestDto,
    responses(
        (status = 201, description = "Document attached", body = DocumentDto),
        (status = 400, description = "Unknown document type", body = ApiError),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "documents"
)]
pub async fn attach_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(tender_id): Path<Uuid>,
    Json(request): Json<AttachDocumentRequestDto>,
) -> Result<(StatusCode, Json<DocumentDto>), ApiError> {
    let created = state
        .workflow
        .attach_document(
            tender_id,
            actor,
            &request.document_type,
            request.storage_key,
            request.description,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List document metadata for a tender, newest first
#[utoipa::path(
    get,
    path = "/api/v1/tenders/{id}/documents",
    params(
        ("id" = Uuid, Path, description = "Tender UUID"),
        crate::auth::ActorHeaders
    ),
    responses(
        (status = 200, description = "Documents", body = [DocumentDto]),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    _actor: Actor,
    Path(tender_id): Path<Uuid>,
) -> Result<Json<Vec<DocumentDto>>, ApiError> {
    let documents = state.workflow.documents(tender_id).await?;
    Ok(Json(documents.into_iter().map(DocumentDto::from).collect()))
}
