//! Approval task model.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Approval task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Completed,
}

/// Reviewer decision on a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
    #[serde(rename = "Needs Revision")]
    NeedsRevision,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::NeedsRevision => "Needs Revision",
        }
    }

    /// Action code recorded on the request's approval steps.
    pub fn step_action(self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::NeedsRevision => "NEEDS_REVISION",
        }
    }

    /// Parses CLI/form input (`approve`, `reject`, `revise`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" => Some(Self::Approved),
            "reject" | "rejected" => Some(Self::Rejected),
            "revise" | "needs-revision" | "needs revision" | "request-changes" => {
                Some(Self::NeedsRevision)
            }
            _ => None,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Approval task referencing a request by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: String,
    /// Informal reference; the request may no longer exist.
    pub request_id: String,
    #[serde(default)]
    pub approver: String,
    pub status: ApprovalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

impl Approval {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::Decision;

    #[test]
    fn parses_decision_aliases() {
        assert_eq!(Decision::parse("Approve"), Some(Decision::Approved));
        assert_eq!(Decision::parse(" rejected "), Some(Decision::Rejected));
        assert_eq!(Decision::parse("revise"), Some(Decision::NeedsRevision));
        assert_eq!(Decision::parse("maybe"), None);
    }
}
