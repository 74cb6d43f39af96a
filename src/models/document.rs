//! Document entity model
//!
//! Metadata for files held in the external blob store. The workflow never
//! inspects file bytes; storage_key is an opaque reference.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

/// Document metadata record attached to a tender
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Unique identifier for the document (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tender the document is attached to
    pub tender_id: Uuid,

    /// User who uploaded the document
    pub uploader_id: Uuid,

    /// Declared type: notice, spec, bid, contract, or other
    pub document_type: String,

    /// Opaque reference into the blob store
    pub storage_key: String,

    /// Optional description
    pub description: Option<String>,

    /// Timestamp when the document was recorded
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tender::Entity",
        from = "Column::TenderId",
        to = "super::tender::Column::Id"
    )]
    Tender,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploaderId",
        to = "super::user::Column::Id"
    )]
    Uploader,
}

impl Related<super::tender::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
