//! # Data Models
//!
//! This module contains the SeaORM entity models used throughout the
//! Tenders API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod approval;
pub mod audit_log;
pub mod checklist_item;
pub mod company;
pub mod department;
pub mod document;
pub mod manager_assignment;
pub mod tender;
pub mod tender_category;
pub mod tender_timeline;
pub mod user;

pub use approval::Entity as Approval;
pub use audit_log::Entity as AuditLog;
pub use checklist_item::Entity as ChecklistItem;
pub use company::Entity as Company;
pub use department::Entity as Department;
pub use document::Entity as Document;
pub use manager_assignment::Entity as ManagerAssignment;
pub use tender::Entity as Tender;
pub use tender_category::Entity as TenderCategory;
pub use tender_timeline::Entity as TenderTimeline;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "tenders".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
