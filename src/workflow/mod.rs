//! # Workflow Layer
//!
//! Status vocabulary and transition tables, the lifecycle controller, the
//! checklist engine, and the supporting pieces (reference numbering,
//! timeline derivation, manager assignment). Everything below the HTTP
//! handlers and above the repositories lives here.

use uuid::Uuid;

pub mod assignment;
pub mod checklist;
pub mod lifecycle;
pub mod reference;
pub mod status;
pub mod timeline;

pub use checklist::ChecklistEngine;
pub use lifecycle::{TenderDetail, TenderWorkflow};
pub use status::{Operation, Role, TenderStatus, WorkflowMode, authorize};

/// Authenticated actor identity, resolved by the HTTP layer and passed to
/// every workflow operation.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}
