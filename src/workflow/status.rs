//! Status vocabulary, roles, and the declarative transition tables.
//!
//! The transition table is the sole source of truth for legality: the
//! lifecycle controller consults it before mutating anything, and any
//! transition not listed fails with `InvalidTransition`. Authorization is a
//! pure `(role, operation) -> allow` function so it can be tested without
//! storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Workflow status of a tender.
///
/// Two vocabularies coexist: the managed path
/// (`pending_superuser_approval` / `in_progress` / `pending_final_approval` /
/// `rejected`) and the legacy linear path (`in_review` / `approved` /
/// `submitted`). `draft`, `awarded`, and `closed` are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    Draft,
    InReview,
    Approved,
    Submitted,
    PendingSuperuserApproval,
    InProgress,
    PendingFinalApproval,
    Rejected,
    Awarded,
    Closed,
}

impl TenderStatus {
    /// The literal token stored in the status column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Draft => "draft",
            TenderStatus::InReview => "in_review",
            TenderStatus::Approved => "approved",
            TenderStatus::Submitted => "submitted",
            TenderStatus::PendingSuperuserApproval => "pending_superuser_approval",
            TenderStatus::InProgress => "in_progress",
            TenderStatus::PendingFinalApproval => "pending_final_approval",
            TenderStatus::Rejected => "rejected",
            TenderStatus::Awarded => "awarded",
            TenderStatus::Closed => "closed",
        }
    }

    /// Terminal statuses have no outgoing edges in either table.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TenderStatus::Rejected | TenderStatus::Closed)
    }
}

impl fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TenderStatus::Draft),
            "in_review" => Ok(TenderStatus::InReview),
            "approved" => Ok(TenderStatus::Approved),
            "submitted" => Ok(TenderStatus::Submitted),
            "pending_superuser_approval" => Ok(TenderStatus::PendingSuperuserApproval),
            "in_progress" => Ok(TenderStatus::InProgress),
            "pending_final_approval" => Ok(TenderStatus::PendingFinalApproval),
            "rejected" => Ok(TenderStatus::Rejected),
            "awarded" => Ok(TenderStatus::Awarded),
            "closed" => Ok(TenderStatus::Closed),
            other => Err(format!("unknown tender status: {other}")),
        }
    }
}

/// Closed set of actor roles supplied by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Originator: creates tenders and submits them for review.
    BdTeam,
    /// Manages checklists, final review, award and close.
    Manager,
    /// Approves/rejects tenders and assigns a manager.
    Superuser,
    /// Administrative superset of superuser and manager.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::BdTeam => "bd_team",
            Role::Manager => "manager",
            Role::Superuser => "superuser",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bd_team" => Ok(Role::BdTeam),
            "manager" => Ok(Role::Manager),
            "superuser" => Ok(Role::Superuser),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Which transition-table configuration a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    /// Superuser approval, manager assignment, checklist gating.
    Managed,
    /// Legacy linear path without the superuser/manager workflow.
    Linear,
}

/// Allowed (from, to) edges for the managed workflow.
const MANAGED_TRANSITIONS: &[(TenderStatus, TenderStatus)] = &[
    (TenderStatus::Draft, TenderStatus::PendingSuperuserApproval),
    (TenderStatus::PendingSuperuserApproval, TenderStatus::InProgress),
    (TenderStatus::PendingSuperuserApproval, TenderStatus::Rejected),
    (TenderStatus::InProgress, TenderStatus::PendingFinalApproval),
    (TenderStatus::PendingFinalApproval, TenderStatus::Awarded),
    (TenderStatus::PendingFinalApproval, TenderStatus::Closed),
    (TenderStatus::Awarded, TenderStatus::Closed),
];

/// Allowed (from, to) edges for the legacy linear workflow.
const LINEAR_TRANSITIONS: &[(TenderStatus, TenderStatus)] = &[
    (TenderStatus::Draft, TenderStatus::InReview),
    (TenderStatus::InReview, TenderStatus::Approved),
    (TenderStatus::InReview, TenderStatus::Draft),
    (TenderStatus::Approved, TenderStatus::Submitted),
    (TenderStatus::Submitted, TenderStatus::Awarded),
    (TenderStatus::Submitted, TenderStatus::Closed),
    (TenderStatus::Awarded, TenderStatus::Closed),
];

impl WorkflowMode {
    /// The transition table for this configuration.
    pub fn transitions(&self) -> &'static [(TenderStatus, TenderStatus)] {
        match self {
            WorkflowMode::Managed => MANAGED_TRANSITIONS,
            WorkflowMode::Linear => LINEAR_TRANSITIONS,
        }
    }

    /// Whether `from -> to` is a legal edge in this configuration.
    pub fn allows(&self, from: TenderStatus, to: TenderStatus) -> bool {
        self.transitions().iter().any(|&(f, t)| f == from && t == to)
    }
}

impl FromStr for WorkflowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "managed" => Ok(WorkflowMode::Managed),
            "linear" => Ok(WorkflowMode::Linear),
            other => Err(format!("unknown workflow mode: {other}")),
        }
    }
}

/// Operations exposed by the lifecycle controller, used as keys into the
/// authorization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateTender,
    SubmitForReview,
    SuperuserReview,
    ApproveTender,
    SubmitTender,
    CreateChecklist,
    CompleteChecklistItem,
    UndoChecklistCompletion,
    ReviewChecklistItem,
    SubmitToFinalReview,
    AwardTender,
    CloseTender,
    AttachDocument,
}

/// Pure role-based authorization table.
///
/// Completion/undo of a checklist item additionally allows the item's
/// assignee; that ownership check happens in the checklist engine because it
/// needs the item, not just the role.
pub fn authorize(role: Role, operation: Operation) -> bool {
    use Operation::*;

    match operation {
        CreateTender | SubmitForReview => matches!(role, Role::BdTeam | Role::Admin),
        SuperuserReview => matches!(role, Role::Superuser | Role::Admin),
        ApproveTender => matches!(role, Role::Manager | Role::Admin),
        SubmitTender => matches!(role, Role::Manager | Role::Admin),
        CreateChecklist | ReviewChecklistItem | SubmitToFinalReview => {
            matches!(role, Role::Manager | Role::Admin)
        }
        CompleteChecklistItem | UndoChecklistCompletion => {
            matches!(role, Role::Manager | Role::Admin)
        }
        AwardTender | CloseTender => matches!(role, Role::Manager | Role::Admin),
        AttachDocument => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TenderStatus::Draft,
            TenderStatus::InReview,
            TenderStatus::Approved,
            TenderStatus::Submitted,
            TenderStatus::PendingSuperuserApproval,
            TenderStatus::InProgress,
            TenderStatus::PendingFinalApproval,
            TenderStatus::Rejected,
            TenderStatus::Awarded,
            TenderStatus::Closed,
        ] {
            assert_eq!(status.as_str().parse::<TenderStatus>(), Ok(status));
        }
        assert!("bogus".parse::<TenderStatus>().is_err());
    }

    #[test]
    fn test_managed_transitions() {
        let mode = WorkflowMode::Managed;
        assert!(mode.allows(TenderStatus::Draft, TenderStatus::PendingSuperuserApproval));
        assert!(mode.allows(TenderStatus::PendingSuperuserApproval, TenderStatus::InProgress));
        assert!(mode.allows(TenderStatus::PendingSuperuserApproval, TenderStatus::Rejected));
        assert!(mode.allows(TenderStatus::InProgress, TenderStatus::PendingFinalApproval));
        assert!(mode.allows(TenderStatus::PendingFinalApproval, TenderStatus::Awarded));
        assert!(mode.allows(TenderStatus::Awarded, TenderStatus::Closed));

        // Linear-only edges are illegal in managed mode
        assert!(!mode.allows(TenderStatus::Draft, TenderStatus::InReview));
        assert!(!mode.allows(TenderStatus::Draft, TenderStatus::InProgress));
        assert!(!mode.allows(TenderStatus::Rejected, TenderStatus::Draft));
    }

    #[test]
    fn test_linear_transitions() {
        let mode = WorkflowMode::Linear;
        assert!(mode.allows(TenderStatus::Draft, TenderStatus::InReview));
        assert!(mode.allows(TenderStatus::InReview, TenderStatus::Draft));
        assert!(mode.allows(TenderStatus::InReview, TenderStatus::Approved));
        assert!(mode.allows(TenderStatus::Approved, TenderStatus::Submitted));
        assert!(mode.allows(TenderStatus::Submitted, TenderStatus::Awarded));
        assert!(!mode.allows(TenderStatus::Draft, TenderStatus::PendingSuperuserApproval));
    }

    #[test]
    fn test_terminal_statuses_have_no_outgoing_edges() {
        for mode in [WorkflowMode::Managed, WorkflowMode::Linear] {
            for &(from, _) in mode.transitions() {
                assert!(
                    !from.is_terminal(),
                    "{from} is terminal but has an outgoing edge"
                );
            }
        }
    }

    #[test]
    fn test_authorization_table() {
        assert!(authorize(Role::BdTeam, Operation::CreateTender));
        assert!(!authorize(Role::Manager, Operation::CreateTender));
        assert!(authorize(Role::Superuser, Operation::SuperuserReview));
        assert!(!authorize(Role::BdTeam, Operation::SuperuserReview));
        assert!(!authorize(Role::Manager, Operation::SuperuserReview));
        assert!(authorize(Role::Manager, Operation::CreateChecklist));
        assert!(!authorize(Role::BdTeam, Operation::CreateChecklist));
        assert!(authorize(Role::Manager, Operation::AwardTender));
        assert!(authorize(Role::Admin, Operation::AwardTender));
        assert!(!authorize(Role::Superuser, Operation::AwardTender));
        assert!(authorize(Role::BdTeam, Operation::AttachDocument));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("bd_team".parse::<Role>(), Ok(Role::BdTeam));
        assert_eq!("manager".parse::<Role>(), Ok(Role::Manager));
        assert!("intern".parse::<Role>().is_err());
    }
}
