//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for the workflow entities. Repositories are generic over
//! `ConnectionTrait` so the same code runs against the pool or inside a
//! lifecycle transaction.

pub mod approval;
pub mod audit_log;
pub mod checklist_item;
pub mod document;
pub mod tender;
pub mod user;

pub use approval::{ApprovalRepository, ApprovalStatus};
pub use audit_log::{AuditAction, AuditLogRepository};
pub use checklist_item::{ChecklistItemRepository, NewChecklistItem};
pub use document::DocumentRepository;
pub use tender::{NewTender, TenderRepository};
pub use user::UserRepository;
