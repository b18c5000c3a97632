//! Personnel request model.
//!
//! # Invariants
//! - `submitted` is an ISO `YYYY-MM-DD` string when set by the portal; seeded
//!   or legacy values are kept verbatim.
//! - `approval_steps` only ever grows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Category of personnel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "New Position")]
    NewPosition,
    Change,
    Promotion,
    Sabbatical,
    Leave,
    Offboarding,
    #[serde(other)]
    Other,
}

impl RequestType {
    pub fn label(self) -> &'static str {
        match self {
            Self::NewPosition => "New Position",
            Self::Change => "Change",
            Self::Promotion => "Promotion",
            Self::Sabbatical => "Sabbatical",
            Self::Leave => "Leave",
            Self::Offboarding => "Offboarding",
            Self::Other => "Other",
        }
    }
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Draft,
    #[serde(rename = "Pending Review")]
    PendingReview,
    Approved,
    Rejected,
    #[serde(rename = "Needs Revision")]
    NeedsRevision,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingReview => "Pending Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::NeedsRevision => "Needs Revision",
        }
    }

    /// Statuses counted as "in progress" on the dashboard.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            Self::PendingReview | Self::NeedsRevision | Self::Draft
        )
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded reviewer action on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStep {
    /// `APPROVED`, `REJECTED` or `NEEDS_REVISION`.
    pub action: String,
    pub approved_by: String,
    pub approved_at: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Personnel request record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub title: String,
    #[serde(default)]
    pub dept: String,
    #[serde(default)]
    pub requester: String,
    #[serde(default)]
    pub submitted: String,
    pub status: RequestStatus,
    /// Raw form fields captured at submission.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub approval_steps: Vec<ApprovalStep>,
}

impl Request {
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}
