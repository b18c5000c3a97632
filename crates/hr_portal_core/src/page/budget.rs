//! Position control and grant-funded roles.

use super::{Mount, PageAction, PageModule, PageResult, Reaction};
use crate::service::report_service::{format_currency, ReportService};
use crate::ui::Tone;

#[derive(Debug, Default)]
pub struct PositionsPage;

impl PageModule for PositionsPage {
    fn title(&self) -> Option<&'static str> {
        Some("Position Control")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let control = ReportService::new(mount.store).position_control();
        mount
            .container
            .heading(1, "Position Control")
            .kpi("Total Positions", control.total)
            .kpi("Filled", control.filled)
            .kpi("Open", control.open)
            .kpi("Estimated Salary", format_currency(control.estimated_salary));
        Ok(())
    }

    fn handle(&mut self, action: PageAction, _mount: &mut Mount<'_>) -> PageResult<Reaction> {
        Ok(match action {
            PageAction::Navigate(route) => Reaction::Navigate(route),
            _ => Reaction::None,
        })
    }
}

#[derive(Debug, Default)]
pub struct GrantsPage;

impl PageModule for GrantsPage {
    fn title(&self) -> Option<&'static str> {
        Some("Grant-Funded Roles")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let positions = ReportService::new(mount.store).grant_positions();
        let surface = &mut *mount.container;
        surface.heading(1, "Grant-Funded Roles");
        if positions.is_empty() {
            surface.notice(Tone::Neutral, "No grant-funded positions at this time.");
            return Ok(());
        }
        let rows = positions
            .iter()
            .map(|request| {
                let salary = request
                    .detail("salary")
                    .and_then(|value| value.parse::<f64>().ok())
                    .map(format_currency)
                    .unwrap_or_else(|| "-".to_string());
                vec![
                    request.title.clone(),
                    request.dept.clone(),
                    request.status.to_string(),
                    salary,
                    request.detail("endDate").unwrap_or("-").to_string(),
                ]
            })
            .collect();
        surface.table(
            &["Position", "Department", "Status", "Salary", "Funding Ends"],
            rows,
        );
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
