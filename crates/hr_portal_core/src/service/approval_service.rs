//! Approval workflow.
//!
//! # Responsibility
//! - Record reviewer decisions on pending approvals.
//! - Apply the configured approval policy to the referenced request.
//!
//! # Invariants
//! - One decision is one persisted write covering request and approval.
//! - Only `Pending` approvals can be decided.
//! - Decided approvals move to the end of the collection as `Completed`.
//! - A dangling `requestId` does not block completing the approval.

use super::{ServiceError, ServiceResult};
use crate::config::ApprovalPolicy;
use crate::model::approval::{Approval, ApprovalStatus, Decision};
use crate::model::request::{ApprovalStep, Request, RequestStatus};
use crate::state::{ApprovalFilter, StateStore};
use chrono::NaiveDate;
use log::{info, warn};
use serde_json::Value;

/// A pending approval joined with its request, when the request exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalItem {
    pub approval: Approval,
    pub request: Option<Request>,
}

/// Result of one recorded decision.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub approval_id: String,
    pub request_id: String,
    pub decision: Decision,
    /// `None` when the referenced request no longer exists.
    pub request_status: Option<RequestStatus>,
    /// Approving steps on the request after this decision.
    pub approvals_recorded: usize,
}

impl DecisionOutcome {
    /// Toast text shown after the decision.
    pub fn message(&self) -> String {
        format!(
            "Request {} successfully",
            self.decision.label().to_lowercase()
        )
    }
}

pub struct ApprovalService<'s> {
    store: &'s mut StateStore,
    policy: ApprovalPolicy,
}

impl<'s> ApprovalService<'s> {
    pub fn new(store: &'s mut StateStore, policy: ApprovalPolicy) -> Self {
        Self { store, policy }
    }

    pub fn pending(&self) -> Vec<ApprovalItem> {
        self.join(
            self.store
                .approvals(&ApprovalFilter::with_status(ApprovalStatus::Pending)),
        )
    }

    /// Every approval no longer pending, in stored order.
    pub fn decided(&self) -> Vec<ApprovalItem> {
        let decided = self
            .store
            .approvals(&ApprovalFilter::default())
            .into_iter()
            .filter(|approval| !approval.is_pending())
            .collect();
        self.join(decided)
    }

    /// Records `decision` on approval `approval_id`.
    ///
    /// # Errors
    /// - `NotFound` when no approval has that id.
    /// - `InvalidTransition` when the approval is not `Pending`.
    /// - `State` when persisting fails.
    pub fn decide(
        &mut self,
        approval_id: &str,
        decision: Decision,
        note: &str,
        decided_by: &str,
        today: NaiveDate,
    ) -> ServiceResult<DecisionOutcome> {
        let approval = self
            .store
            .approval(approval_id)
            .ok_or_else(|| ServiceError::NotFound {
                kind: "approval",
                id: approval_id.to_string(),
            })?;
        if !approval.is_pending() {
            return Err(ServiceError::InvalidTransition {
                id: approval_id.to_string(),
                status: format!("{:?}", approval.status),
            });
        }

        let date = today.format("%Y-%m-%d").to_string();
        let step = ApprovalStep {
            action: decision.step_action().to_string(),
            approved_by: decided_by.to_string(),
            approved_at: date.clone(),
            comment: note.trim().to_string(),
        };
        let step = serde_json::to_value(&step)?;
        let required = self.policy.required_approvals.max(1);

        let (request_status, approvals_recorded) = self.store.transact(|doc| {
            let request_result = record_on_request(doc, &approval.request_id, step, decision, required);
            complete_approval(doc, approval_id, decision, note.trim(), &date);
            request_result
        })?;

        if request_status.is_none() {
            warn!(
                "event=approval_decide module=service status=dangling approval_id={} request_id={}",
                approval_id, approval.request_id
            );
        }
        info!(
            "event=approval_decide module=service status=ok approval_id={} decision={} approvals_recorded={}",
            approval_id,
            decision.step_action(),
            approvals_recorded
        );

        Ok(DecisionOutcome {
            approval_id: approval_id.to_string(),
            request_id: approval.request_id,
            decision,
            request_status,
            approvals_recorded,
        })
    }

    fn join(&self, approvals: Vec<Approval>) -> Vec<ApprovalItem> {
        approvals
            .into_iter()
            .map(|approval| {
                let request = self.store.request(&approval.request_id);
                ApprovalItem { approval, request }
            })
            .collect()
    }
}

/// Appends the step and applies the policy. Returns the request's resulting
/// status and approving-step count, or `(None, 0)` without a request.
fn record_on_request(
    doc: &mut Value,
    request_id: &str,
    step: Value,
    decision: Decision,
    required: usize,
) -> (Option<RequestStatus>, usize) {
    let Some(request) = doc
        .get_mut("requests")
        .and_then(Value::as_array_mut)
        .and_then(|requests| requests.iter_mut().find(|item| item["id"] == request_id))
    else {
        return (None, 0);
    };
    let Some(record) = request.as_object_mut() else {
        return (None, 0);
    };

    let steps = record
        .entry("approvalSteps")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !steps.is_array() {
        *steps = Value::Array(Vec::new());
    }
    let approvals_recorded = match steps {
        Value::Array(steps) => {
            steps.push(step);
            steps
                .iter()
                .filter(|step| step["action"] == Decision::Approved.step_action())
                .count()
        }
        _ => 0,
    };

    let current = record
        .get("status")
        .and_then(|status| serde_json::from_value::<RequestStatus>(status.clone()).ok());
    let next = match decision {
        Decision::Rejected => Some(RequestStatus::Rejected),
        Decision::NeedsRevision => Some(RequestStatus::NeedsRevision),
        Decision::Approved if approvals_recorded >= required => Some(RequestStatus::Approved),
        Decision::Approved => current,
    };
    if let Some(status) = next {
        record.insert(
            "status".to_string(),
            Value::String(status.label().to_string()),
        );
    }
    (next, approvals_recorded)
}

fn complete_approval(doc: &mut Value, approval_id: &str, decision: Decision, note: &str, date: &str) {
    let Some(approvals) = doc.get_mut("approvals").and_then(Value::as_array_mut) else {
        return;
    };
    let Some(index) = approvals.iter().position(|item| item["id"] == approval_id) else {
        return;
    };
    let mut approval = approvals.remove(index);
    if let Some(record) = approval.as_object_mut() {
        record.insert("status".to_string(), Value::String("Completed".to_string()));
        record.insert("completedDate".to_string(), Value::String(date.to_string()));
        record.insert("note".to_string(), Value::String(note.to_string()));
        record.insert(
            "decision".to_string(),
            Value::String(decision.label().to_string()),
        );
    }
    approvals.push(approval);
}

#[cfg(test)]
mod tests {
    use super::record_on_request;
    use crate::model::approval::Decision;
    use crate::model::request::RequestStatus;
    use serde_json::json;

    #[test]
    fn approval_below_threshold_keeps_status() {
        let mut doc = json!({"requests": [{"id": "r1", "status": "Pending Review"}]});
        let step = json!({"action": "APPROVED", "approvedBy": "a", "approvedAt": "2025-05-01"});

        let (status, count) = record_on_request(&mut doc, "r1", step.clone(), Decision::Approved, 2);
        assert_eq!(status, Some(RequestStatus::PendingReview));
        assert_eq!(count, 1);
        assert_eq!(doc["requests"][0]["status"], "Pending Review");

        let (status, count) = record_on_request(&mut doc, "r1", step, Decision::Approved, 2);
        assert_eq!(status, Some(RequestStatus::Approved));
        assert_eq!(count, 2);
        assert_eq!(doc["requests"][0]["approvalSteps"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn rejection_applies_immediately_and_missing_request_is_tolerated() {
        let mut doc = json!({"requests": [{"id": "r1", "status": "Pending Review"}]});
        let step = json!({"action": "REJECTED", "approvedBy": "a", "approvedAt": "2025-05-01"});

        let (status, _) = record_on_request(&mut doc, "r1", step.clone(), Decision::Rejected, 2);
        assert_eq!(status, Some(RequestStatus::Rejected));

        let (status, count) = record_on_request(&mut doc, "gone", step, Decision::Rejected, 2);
        assert_eq!((status, count), (None, 0));
    }
}
