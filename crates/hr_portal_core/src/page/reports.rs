//! Request status summary and six-month activity breakdown.

use super::{Mount, PageAction, PageModule, PageResult, Reaction};
use crate::service::report_service::ReportService;

#[derive(Debug, Default)]
pub struct SummaryPage;

impl PageModule for SummaryPage {
    fn title(&self) -> Option<&'static str> {
        Some("Reports Summary")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let reports = ReportService::new(mount.store);
        let summary = reports.status_summary();
        let months = reports.monthly_breakdown(mount.today);

        let surface = &mut *mount.container;
        surface
            .heading(1, "Reports Summary")
            .kpi("Total Requests", summary.total)
            .kpi("Approved", summary.approved)
            .kpi("Pending", summary.pending)
            .kpi("Rejected", summary.rejected);

        let rows = months
            .into_iter()
            .map(|bucket| {
                vec![
                    bucket.label,
                    bucket.submitted.to_string(),
                    bucket.approved.to_string(),
                ]
            })
            .collect();
        surface
            .heading(2, "Monthly Breakdown")
            .table(&["Month", "Submitted", "Approved"], rows);
        Ok(())
    }

    fn handle(&mut self, action: PageAction, _mount: &mut Mount<'_>) -> PageResult<Reaction> {
        Ok(match action {
            PageAction::Navigate(route) => Reaction::Navigate(route),
            _ => Reaction::None,
        })
    }
}
