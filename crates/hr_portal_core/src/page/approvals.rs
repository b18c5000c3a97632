//! Approval queue and decision history.

use super::{Mount, PageAction, PageModule, PageResult, Reaction};
use crate::env::ListenerId;
use crate::model::approval::{ApprovalStatus, Decision};
use crate::service::approval_service::{ApprovalItem, ApprovalService};
use crate::service::ServiceError;
use crate::ui::{Block, Tone};
use log::debug;

fn request_columns(item: &ApprovalItem) -> (String, String, String, String) {
    match &item.request {
        Some(request) => (
            request.title.clone(),
            request.kind.to_string(),
            request.dept.clone(),
            request.requester.clone(),
        ),
        None => (
            format!("Missing request {}", item.approval.request_id),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
        ),
    }
}

/// Pending approvals with an inline review panel.
///
/// While the panel is open, `Escape` closes it.
#[derive(Debug, Default)]
pub struct PendingApprovalsPage {
    selected: Option<String>,
    note: String,
    escape: Option<ListenerId>,
}

impl PendingApprovalsPage {
    fn close_panel(&mut self, mount: &mut Mount<'_>) {
        self.selected = None;
        self.note.clear();
        if let Some(listener) = self.escape.take() {
            mount.scope.remove_key(listener);
        }
    }
}

impl PageModule for PendingApprovalsPage {
    fn title(&self) -> Option<&'static str> {
        Some("Pending Approvals")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let items = ApprovalService::new(mount.store, mount.config.approval).pending();
        let surface = &mut *mount.container;
        surface.heading(1, "Pending Approvals");
        if items.is_empty() {
            surface.notice(Tone::Success, "No pending approvals. You're all caught up!");
            return Ok(());
        }

        let rows = items
            .iter()
            .map(|item| {
                let (title, kind, dept, requester) = request_columns(item);
                vec![
                    item.approval.id.clone(),
                    title,
                    kind,
                    dept,
                    requester,
                    item.approval.due.clone().unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        surface.table(
            &["ID", "Request", "Type", "Department", "Requester", "Due"],
            rows,
        );
        for item in &items {
            surface.button(
                format!("Review {}", item.approval.id),
                PageAction::Select(item.approval.id.clone()),
            );
        }

        let Some(selected) = self.selected.as_deref() else {
            return Ok(());
        };
        let Some(item) = items.iter().find(|item| item.approval.id == selected) else {
            return Ok(());
        };
        let (title, kind, dept, requester) = request_columns(item);
        surface
            .heading(2, "Review Request")
            .detail("Request", title)
            .detail("Type", kind)
            .detail("Department", dept)
            .detail("Requester", requester);
        if let Some(request) = &item.request {
            surface
                .detail("Submitted", request.submitted.as_str())
                .detail("Status", request.status.to_string());
        }
        surface.push(Block::Field {
            name: "note".to_string(),
            label: "Comments".to_string(),
            value: self.note.clone(),
            required: false,
        });
        for decision in [Decision::Approved, Decision::Rejected, Decision::NeedsRevision] {
            let label = match decision {
                Decision::Approved => "Approve",
                Decision::Rejected => "Reject",
                Decision::NeedsRevision => "Request Changes",
            };
            surface.button(
                label,
                PageAction::Decide {
                    approval_id: item.approval.id.clone(),
                    decision,
                    note: String::new(),
                },
            );
        }
        surface.button("Cancel", PageAction::Cancel);
        Ok(())
    }

    fn handle(&mut self, action: PageAction, mount: &mut Mount<'_>) -> PageResult<Reaction> {
        match action {
            PageAction::Select(id) => {
                self.selected = Some(id);
                self.note.clear();
                if self.escape.is_none() {
                    self.escape = Some(mount.scope.on_key("Escape", PageAction::Cancel));
                }
                Ok(Reaction::Rerender)
            }
            PageAction::Input { field, value } if field == "note" => {
                self.note = value;
                Ok(Reaction::None)
            }
            PageAction::Cancel => {
                if self.selected.is_none() {
                    return Ok(Reaction::None);
                }
                self.close_panel(mount);
                Ok(Reaction::Rerender)
            }
            PageAction::Decide {
                approval_id,
                decision,
                note,
            } => {
                let note = if note.trim().is_empty() {
                    self.note.clone()
                } else {
                    note
                };
                let decided_by = mount.user_name();
                let result = ApprovalService::new(mount.store, mount.config.approval).decide(
                    &approval_id,
                    decision,
                    &note,
                    &decided_by,
                    mount.today,
                );
                match result {
                    Ok(outcome) => {
                        mount.toasts.success(outcome.message());
                    }
                    Err(
                        err @ (ServiceError::NotFound { .. }
                        | ServiceError::InvalidTransition { .. }),
                    ) => {
                        debug!("event=approval_decide module=page status=rejected error={err}");
                        mount.toasts.error(err.user_message());
                    }
                    Err(err) => return Err(err.into()),
                }
                self.close_panel(mount);
                Ok(Reaction::Rerender)
            }
            PageAction::Navigate(route) => Ok(Reaction::Navigate(route)),
            _ => Ok(Reaction::None),
        }
    }

    fn cleanup(&mut self) {
        self.selected = None;
        self.note.clear();
        // The scope that owned the listener is released by the router.
        self.escape = None;
    }
}

/// Approvals that are no longer pending.
#[derive(Debug, Default)]
pub struct CompletedApprovalsPage;

impl PageModule for CompletedApprovalsPage {
    fn title(&self) -> Option<&'static str> {
        Some("Completed Approvals")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let items = ApprovalService::new(mount.store, mount.config.approval).decided();
        let surface = &mut *mount.container;
        surface.heading(1, "Completed Approvals");
        if items.is_empty() {
            surface.notice(Tone::Neutral, "No completed approvals yet.");
            return Ok(());
        }
        let rows = items
            .iter()
            .map(|item| {
                let (title, _, dept, _) = request_columns(item);
                let outcome = match (item.approval.decision, item.approval.status) {
                    (Some(decision), _) => decision.label().to_string(),
                    (None, ApprovalStatus::Approved) => "Approved".to_string(),
                    (None, status) => format!("{status:?}"),
                };
                vec![
                    item.approval.id.clone(),
                    title,
                    dept,
                    outcome,
                    item.approval
                        .completed_date
                        .clone()
                        .unwrap_or_else(|| "-".to_string()),
                    item.approval.note.clone().unwrap_or_default(),
                ]
            })
            .collect();
        surface.table(
            &["ID", "Request", "Department", "Decision", "Completed", "Note"],
            rows,
        );
        Ok(())
    }

    fn handle(&mut self, action: PageAction, _mount: &mut Mount<'_>) -> PageResult<Reaction> {
        Ok(match action {
            PageAction::Navigate(route) => Reaction::Navigate(route),
            _ => Reaction::None,
        })
    }
}
