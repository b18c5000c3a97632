//! Dashboard, budget and summary figures derived from the request list.

use crate::model::approval::ApprovalStatus;
use crate::model::request::{Request, RequestStatus, RequestType};
use crate::state::{ApprovalFilter, RequestFilter, StateStore};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardKpis {
    pub pending_approvals: usize,
    /// Approved requests submitted in the current calendar month.
    pub completed_this_month: usize,
    pub in_progress: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSummary {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    /// `Mon YYYY`.
    pub label: String,
    pub submitted: usize,
    pub approved: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionControl {
    pub total: usize,
    pub filled: usize,
    pub open: usize,
    /// Sum of `details.salary` over approved new positions.
    pub estimated_salary: f64,
}

pub struct ReportService<'s> {
    store: &'s StateStore,
}

impl<'s> ReportService<'s> {
    pub fn new(store: &'s StateStore) -> Self {
        Self { store }
    }

    fn all_requests(&self) -> Vec<Request> {
        self.store.requests(&RequestFilter::default())
    }

    pub fn dashboard_kpis(&self, today: NaiveDate) -> DashboardKpis {
        let requests = self.all_requests();
        let pending_approvals = self
            .store
            .approvals(&ApprovalFilter::with_status(ApprovalStatus::Pending))
            .len();
        let completed_this_month = requests
            .iter()
            .filter(|request| request.status == RequestStatus::Approved)
            .filter(|request| {
                parse_date(&request.submitted).is_some_and(|submitted| {
                    submitted.year() == today.year() && submitted.month() == today.month()
                })
            })
            .count();
        let in_progress = requests
            .iter()
            .filter(|request| request.status.is_in_progress())
            .count();

        DashboardKpis {
            pending_approvals,
            completed_this_month,
            in_progress,
            total: requests.len(),
        }
    }

    pub fn status_summary(&self) -> StatusSummary {
        let requests = self.all_requests();
        let count = |status: RequestStatus| {
            requests
                .iter()
                .filter(|request| request.status == status)
                .count()
        };
        StatusSummary {
            total: requests.len(),
            approved: count(RequestStatus::Approved),
            pending: count(RequestStatus::PendingReview),
            rejected: count(RequestStatus::Rejected),
        }
    }

    /// Submissions per month for the six months ending with `today`'s month,
    /// oldest first.
    pub fn monthly_breakdown(&self, today: NaiveDate) -> Vec<MonthBucket> {
        let requests = self.all_requests();
        let current = today.year() * 12 + today.month0() as i32;
        (0..6)
            .rev()
            .map(|offset| {
                let index = current - offset;
                let (year, month0) = (index.div_euclid(12), index.rem_euclid(12) as u32);
                let in_month: Vec<&Request> = requests
                    .iter()
                    .filter(|request| {
                        parse_date(&request.submitted).is_some_and(|submitted| {
                            submitted.year() == year && submitted.month0() == month0
                        })
                    })
                    .collect();
                MonthBucket {
                    label: month_label(year, month0),
                    submitted: in_month.len(),
                    approved: in_month
                        .iter()
                        .filter(|request| request.status == RequestStatus::Approved)
                        .count(),
                }
            })
            .collect()
    }

    pub fn position_control(&self) -> PositionControl {
        let positions = self.store.requests(&RequestFilter {
            kind: Some(RequestType::NewPosition),
            ..RequestFilter::default()
        });
        let approved: Vec<&Request> = positions
            .iter()
            .filter(|request| request.status == RequestStatus::Approved)
            .collect();
        let estimated_salary = approved
            .iter()
            .filter_map(|request| request.detail("salary"))
            .filter_map(|salary| salary.trim().parse::<f64>().ok())
            .sum();

        PositionControl {
            total: positions.len(),
            filled: approved.len(),
            open: positions.len() - approved.len(),
            estimated_salary,
        }
    }

    /// New-position requests funded by a grant.
    pub fn grant_positions(&self) -> Vec<Request> {
        self.store
            .requests(&RequestFilter {
                kind: Some(RequestType::NewPosition),
                ..RequestFilter::default()
            })
            .into_iter()
            .filter(|request| request.detail("fundingType") == Some("grant"))
            .collect()
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d").ok()
}

fn month_label(year: i32, month0: u32) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let name = MONTHS.get(month0 as usize).copied().unwrap_or("???");
    format!("{name} {year}")
}

/// Formats an amount with thousands separators and no decimals.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_currency, month_label};

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(72000.4), "$72,000");
        assert_eq!(format_currency(1234567.0), "$1,234,567");
    }

    #[test]
    fn month_label_wraps_year() {
        assert_eq!(month_label(2024, 11), "Dec 2024");
        assert_eq!(month_label(2025, 0), "Jan 2025");
    }
}
