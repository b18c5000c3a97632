//! Landing page: KPIs, quick actions, pending approvals and recent requests.

use super::{Mount, PageAction, PageModule, PageResult, Reaction};
use crate::service::approval_service::ApprovalService;
use crate::service::report_service::ReportService;
use crate::service::request_service::{RequestQuery, RequestService};

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Default)]
pub struct DashboardPage;

impl PageModule for DashboardPage {
    fn title(&self) -> Option<&'static str> {
        Some("Dashboard")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        if let Some(flash) = mount.store.take_flash()? {
            mount.toasts.success(flash);
        }

        let kpis = ReportService::new(mount.store).dashboard_kpis(mount.today);
        let pending = ApprovalService::new(mount.store, mount.config.approval).pending();
        let recent = RequestService::new(mount.store).list(&RequestQuery::default());
        let user_name = mount.user_name();

        let surface = &mut *mount.container;
        surface
            .heading(1, "Dashboard")
            .text(format!("Welcome back, {user_name}"))
            .kpi("Pending Approvals", kpis.pending_approvals)
            .kpi("This Month Completed", kpis.completed_this_month)
            .kpi("In Progress", kpis.in_progress)
            .kpi("System Total", kpis.total);

        surface
            .heading(2, "Quick Actions")
            .button(
                "New Position Request",
                PageAction::navigate("/requests/new-position"),
            )
            .button("Request Leave", PageAction::navigate("/requests/leave"))
            .button("View All Requests", PageAction::navigate("/requests"));
        if !pending.is_empty() {
            surface.button(
                "Review Approvals",
                PageAction::navigate("/approvals/pending"),
            );
            let rows = pending
                .iter()
                .take(PREVIEW_ROWS)
                .map(|item| {
                    let (title, dept) = item.request.as_ref().map_or_else(
                        || ("Unknown".to_string(), "-".to_string()),
                        |request| (request.title.clone(), request.dept.clone()),
                    );
                    vec![
                        title,
                        dept,
                        item.approval.due.clone().unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect();
            surface
                .heading(2, "Your Pending Approvals")
                .table(&["Request", "Department", "Due Date"], rows);
        }

        let rows = recent
            .iter()
            .take(PREVIEW_ROWS)
            .map(|request| {
                vec![
                    request.title.clone(),
                    request.kind.to_string(),
                    request.status.to_string(),
                    request.submitted.clone(),
                ]
            })
            .collect();
        surface
            .heading(2, "Recent Requests")
            .table(&["Title", "Type", "Status", "Submitted"], rows);
        Ok(())
    }

    fn handle(&mut self, action: PageAction, _mount: &mut Mount<'_>) -> PageResult<Reaction> {
        Ok(match action {
            PageAction::Navigate(route) => Reaction::Navigate(route),
            PageAction::Select(id) => Reaction::Navigate(format!("/requests/{id}")),
            _ => Reaction::None,
        })
    }
}
