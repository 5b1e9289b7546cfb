//! Shared approval chain status for leave and overtime requests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    ApprovedBySupervisor,
    ApprovedByManager,
    ApprovedByHr,
    Rejected,
    Cancelled,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::ApprovedBySupervisor => "approved_by_supervisor",
            ApprovalStatus::ApprovedByManager => "approved_by_manager",
            ApprovalStatus::ApprovedByHr => "approved_by_hr",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApprovalStatus::ApprovedByHr | ApprovalStatus::Rejected | ApprovalStatus::Cancelled
        )
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ApprovalStatus::Pending)
    }

    /// States from which HR may finalize directly, bypassing the chain.
    pub fn hr_may_finalize(&self) -> bool {
        matches!(
            self,
            ApprovalStatus::Pending
                | ApprovalStatus::ApprovedBySupervisor
                | ApprovalStatus::ApprovedByManager
        )
    }

    /// Non-terminal states still hold a quota booking.
    pub fn holds_booking(&self) -> bool {
        !self.is_terminal()
    }
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        ApprovalStatus::Pending
    }
}
