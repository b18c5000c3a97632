//! Request listing, form validation and submission.
//!
//! # Responsibility
//! - Filter and order the request list.
//! - Describe each request form and validate its input.
//! - Create `Pending Review` requests and leave a dashboard flash message.
//!
//! # Invariants
//! - Lists are ordered by `submitted` descending; ties keep stored order.
//! - Submitted requests only carry fields declared by their form.

use super::{ServiceError, ServiceResult};
use crate::model::request::{Request, RequestStatus, RequestType};
use crate::model::user::User;
use crate::state::{RequestFilter, StateStore};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeMap;

/// Raw form input keyed by field name.
pub type FormData = BTreeMap<String, String>;

/// Filter plus free-text search for the request list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub filter: RequestFilter,
    /// Case-insensitive match on title, dept or requester.
    pub search: String,
}

impl RequestQuery {
    pub fn matches(&self, request: &Request) -> bool {
        if !self.filter.matches(request) {
            return false;
        }
        let term = self.search.trim().to_lowercase();
        term.is_empty()
            || [&request.title, &request.dept, &request.requester]
                .iter()
                .any(|value| value.to_lowercase().contains(&term))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// `YYYY-MM-DD`.
    Date,
    /// Weekly hours, 1 to 40.
    Hours,
    /// Non-negative amount.
    Salary,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

const fn field(
    name: &'static str,
    label: &'static str,
    required: bool,
    kind: FieldKind,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        required,
        kind,
    }
}

/// Which request form is being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestForm {
    NewPosition,
    Change,
    Leave,
    Offboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSpec {
    pub form: RequestForm,
    pub heading: &'static str,
    pub fields: &'static [FieldSpec],
    pub flash: &'static str,
}

impl FormSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }
}

const FUNDING_TYPES: &[&str] = &["base", "grant"];
const FLSA_STATUSES: &[&str] = &["exempt", "non-exempt"];
const CHANGE_TYPES: &[&str] = &["title", "salary", "hours", "department", "supervisor"];
const LEAVE_TYPES: &[&str] = &["sabbatical", "medical", "family", "personal", "unpaid"];
const OFFBOARD_REASONS: &[&str] = &[
    "resignation",
    "retirement",
    "termination",
    "end-of-appointment",
];

const NEW_POSITION_FIELDS: &[FieldSpec] = &[
    field("employeeName", "Employee Name", true, FieldKind::Text),
    field("hours", "Hours per Week", true, FieldKind::Hours),
    field("salary", "Salary", true, FieldKind::Salary),
    field("department", "Department", true, FieldKind::Text),
    field("startDate", "Start Date", true, FieldKind::Date),
    field("endDate", "End Date", false, FieldKind::Date),
    field("reportsTo", "Reports To", true, FieldKind::Text),
    field("fundingType", "Funding Type", true, FieldKind::Choice(FUNDING_TYPES)),
    field("jobCode", "Job Code", true, FieldKind::Text),
    field("flsa", "FLSA Status", true, FieldKind::Choice(FLSA_STATUSES)),
];

const CHANGE_FIELDS: &[FieldSpec] = &[
    field("employeeName", "Employee Name", true, FieldKind::Text),
    field("department", "Department", true, FieldKind::Text),
    field("changeType", "Change Type", true, FieldKind::Choice(CHANGE_TYPES)),
    field("effectiveDate", "Effective Date", true, FieldKind::Date),
    field("newTitle", "New Title", false, FieldKind::Text),
    field("newSalary", "New Salary", false, FieldKind::Salary),
    field("newHours", "New Hours per Week", false, FieldKind::Hours),
    field("justification", "Justification", true, FieldKind::Text),
];

const LEAVE_FIELDS: &[FieldSpec] = &[
    field("employeeName", "Employee Name", true, FieldKind::Text),
    field("department", "Department", true, FieldKind::Text),
    field("leaveType", "Leave Type", true, FieldKind::Choice(LEAVE_TYPES)),
    field("startDate", "Start Date", true, FieldKind::Date),
    field("endDate", "End Date", true, FieldKind::Date),
    field("coverage", "Coverage Plan", false, FieldKind::Text),
    field("notes", "Notes", false, FieldKind::Text),
];

const OFFBOARD_FIELDS: &[FieldSpec] = &[
    field("employeeName", "Employee Name", true, FieldKind::Text),
    field("department", "Department", true, FieldKind::Text),
    field("lastDay", "Last Day", true, FieldKind::Date),
    field("reason", "Reason", true, FieldKind::Choice(OFFBOARD_REASONS)),
    field("notes", "Notes", false, FieldKind::Text),
];

static NEW_POSITION_SPEC: FormSpec = FormSpec {
    form: RequestForm::NewPosition,
    heading: "New Position Request",
    fields: NEW_POSITION_FIELDS,
    flash: "New position request submitted successfully.",
};

static CHANGE_SPEC: FormSpec = FormSpec {
    form: RequestForm::Change,
    heading: "Employee Change Request",
    fields: CHANGE_FIELDS,
    flash: "Change request submitted successfully.",
};

static LEAVE_SPEC: FormSpec = FormSpec {
    form: RequestForm::Leave,
    heading: "Leave Request",
    fields: LEAVE_FIELDS,
    flash: "Leave request submitted successfully.",
};

static OFFBOARD_SPEC: FormSpec = FormSpec {
    form: RequestForm::Offboard,
    heading: "Offboarding Request",
    fields: OFFBOARD_FIELDS,
    flash: "Offboarding request submitted successfully.",
};

pub fn form_spec(form: RequestForm) -> &'static FormSpec {
    match form {
        RequestForm::NewPosition => &NEW_POSITION_SPEC,
        RequestForm::Change => &CHANGE_SPEC,
        RequestForm::Leave => &LEAVE_SPEC,
        RequestForm::Offboard => &OFFBOARD_SPEC,
    }
}

/// Validates `data` against `spec`, reporting the first failing field.
///
/// # Errors
/// - `ServiceError::Validation` with message `Please fill in the {field} field`
///   for a missing required value, or a range/format message otherwise.
pub fn validate(spec: &FormSpec, data: &FormData) -> ServiceResult<()> {
    for field in spec.fields {
        let value = data.get(field.name).map(|value| value.trim()).unwrap_or("");
        if value.is_empty() {
            if field.required {
                return Err(ServiceError::validation(
                    field.name,
                    format!("Please fill in the {} field", field.name),
                ));
            }
            continue;
        }
        check_kind(field, value)?;
    }
    check_date_order(data)
}

fn check_kind(field: &FieldSpec, value: &str) -> ServiceResult<()> {
    match field.kind {
        FieldKind::Text => Ok(()),
        FieldKind::Date => parse_date(value).map(|_| ()).ok_or_else(|| {
            ServiceError::validation(
                field.name,
                format!("{} must be a date (YYYY-MM-DD)", field.label),
            )
        }),
        FieldKind::Hours => match value.parse::<f64>() {
            Ok(hours) if (1.0..=40.0).contains(&hours) => Ok(()),
            _ => Err(ServiceError::validation(
                field.name,
                format!("{} must be between 1 and 40", field.label),
            )),
        },
        FieldKind::Salary => match value.parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(()),
            _ => Err(ServiceError::validation(
                field.name,
                format!("{} must be a number of at least 0", field.label),
            )),
        },
        FieldKind::Choice(options) => {
            if options.contains(&value) {
                Ok(())
            } else {
                Err(ServiceError::validation(
                    field.name,
                    format!("{} must be one of: {}", field.label, options.join(", ")),
                ))
            }
        }
    }
}

fn check_date_order(data: &FormData) -> ServiceResult<()> {
    let start = data.get("startDate").and_then(|value| parse_date(value));
    let end = data.get("endDate").and_then(|value| parse_date(value));
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ServiceError::validation(
            "endDate",
            "End date cannot be before start date",
        )),
        _ => Ok(()),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Request use-cases bound to one state store.
pub struct RequestService<'s> {
    store: &'s mut StateStore,
}

impl<'s> RequestService<'s> {
    pub fn new(store: &'s mut StateStore) -> Self {
        Self { store }
    }

    /// Filtered requests, newest submission first.
    pub fn list(&self, query: &RequestQuery) -> Vec<Request> {
        sorted_by_submitted(
            self.store
                .requests(&RequestFilter::default())
                .into_iter()
                .filter(|request| query.matches(request))
                .collect(),
        )
    }

    /// Validates and stores a new `Pending Review` request.
    ///
    /// # Side effects
    /// - Appends to `requests`.
    /// - Sets `app.flash` to the form's confirmation message.
    pub fn submit(
        &mut self,
        form: RequestForm,
        data: &FormData,
        today: NaiveDate,
    ) -> ServiceResult<Request> {
        let spec = form_spec(form);
        validate(spec, data)?;

        let user = self.store.user();
        let request = build_request(spec, data, user.as_ref(), today);
        let value = serde_json::to_value(&request)?;
        self.store.push("requests", value)?;
        self.store
            .set("app.flash", serde_json::Value::String(spec.flash.to_string()))?;

        info!(
            "event=request_submit module=service status=ok request_id={} type={}",
            request.id, request.kind
        );
        Ok(request)
    }
}

/// Stable sort by ISO `submitted` date, newest first.
pub fn sorted_by_submitted(mut requests: Vec<Request>) -> Vec<Request> {
    requests.sort_by(|left, right| right.submitted.cmp(&left.submitted));
    requests
}

fn build_request(
    spec: &FormSpec,
    data: &FormData,
    user: Option<&User>,
    today: NaiveDate,
) -> Request {
    let value = |name: &str| {
        data.get(name)
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    };
    let employee = value("employeeName");
    let (kind, title) = match spec.form {
        RequestForm::NewPosition => (
            RequestType::NewPosition,
            format!("New Position: {employee}"),
        ),
        RequestForm::Change => (RequestType::Change, format!("Change: {employee}")),
        RequestForm::Leave if value("leaveType") == "sabbatical" => (
            RequestType::Sabbatical,
            format!("Sabbatical Leave: {employee}"),
        ),
        RequestForm::Leave => (RequestType::Leave, format!("Leave: {employee}")),
        RequestForm::Offboard => (RequestType::Offboarding, format!("Offboarding: {employee}")),
    };

    let details = spec
        .fields
        .iter()
        .filter_map(|field| {
            let value = value(field.name);
            (!value.is_empty()).then(|| (field.name.to_string(), value))
        })
        .collect();

    Request {
        id: format!("r{}", uuid::Uuid::new_v4().simple()),
        kind,
        title,
        dept: value("department"),
        requester: user
            .map(|user| user.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        submitted: today.format("%Y-%m-%d").to_string(),
        status: RequestStatus::PendingReview,
        details,
        approval_steps: Vec::new(),
    }
}
