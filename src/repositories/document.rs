//! # Document Repository
//!
//! Metadata records for files living in the external blob store. The
//! workflow only ever asks "does a spec document exist" and lists metadata;
//! bytes never pass through this service.

use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::document::{ActiveModel, Column, Entity, Model};

/// Declared document types accepted on upload.
pub const DOCUMENT_TYPES: &[&str] = &["notice", "spec", "bid", "contract", "other"];

/// Repository for document metadata
pub struct DocumentRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> DocumentRepository<'a, C> {
    /// Create a new DocumentRepository on the given connection or transaction
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Record metadata for an uploaded document.
    pub async fn insert(
        &self,
        tender_id: Uuid,
        uploader_id: Uuid,
        document_type: &str,
        storage_key: String,
        description: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> Result<Model, WorkflowError> {
        if !DOCUMENT_TYPES.contains(&document_type) {
            return Err(WorkflowError::InvalidArgument(format!(
                "unknown document type: {document_type}"
            )));
        }

        let document = ActiveModel {
            id: Set(Uuid::new_v4()),
            tender_id: Set(tender_id),
            uploader_id: Set(uploader_id),
            document_type: Set(document_type.to_string()),
            storage_key: Set(storage_key),
            description: Set(description),
            created_at: Set(now),
        };

        Ok(document.insert(self.conn).await?)
    }

    /// Whether the tender has at least one document of the given type.
    pub async fn has_document_of_type(
        &self,
        tender_id: Uuid,
        document_type: &str,
    ) -> Result<bool, WorkflowError> {
        let found = Entity::find()
            .filter(Column::TenderId.eq(tender_id))
            .filter(Column::DocumentType.eq(document_type))
            .one(self.conn)
            .await?;

        Ok(found.is_some())
    }

    /// All document metadata for a tender, newest first.
    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Model>, WorkflowError> {
        let documents = Entity::find()
            .filter(Column::TenderId.eq(tender_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.conn)
            .await?;

        Ok(documents)
    }
}
