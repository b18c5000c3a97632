//! Request forms, request list and request detail.

use super::{humanize_key, toast_validation, Mount, PageAction, PageModule, PageResult, Reaction};
use crate::model::request::{Request, RequestStatus, RequestType};
use crate::service::report_service::format_currency;
use crate::service::request_service::{
    form_spec, validate, FieldKind, FormData, FormSpec, RequestForm, RequestQuery, RequestService,
};
use crate::ui::{Block, Surface, Tone};
use log::debug;
use serde::de::DeserializeOwned;

const ITEMS_PER_PAGE: usize = 10;

fn render_fields(surface: &mut Surface, spec: &FormSpec, data: &FormData) {
    for field in spec.fields {
        let label = match field.kind {
            FieldKind::Choice(options) => format!("{} [{}]", field.label, options.join("|")),
            _ => field.label.to_string(),
        };
        surface.push(Block::Field {
            name: field.name.to_string(),
            label,
            value: data.get(field.name).cloned().unwrap_or_default(),
            required: field.required,
        });
    }
}

fn display_value(kind: FieldKind, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "N/A".to_string();
    }
    match kind {
        FieldKind::Salary => value
            .parse::<f64>()
            .map(format_currency)
            .unwrap_or_else(|_| value.to_string()),
        FieldKind::Choice(_) => {
            let mut chars = value.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
        _ => value.to_string(),
    }
}

/// Stores a field edit when the form declares it.
fn record_input(spec: &FormSpec, data: &mut FormData, field: String, value: String) {
    if spec.field(&field).is_some() {
        data.insert(field, value);
    } else {
        debug!("event=form_input module=page status=ignored field={field}");
    }
}

/// Pre-fills the department from the signed-in user's profile.
fn prefill_department(mount: &Mount<'_>, data: &mut FormData) {
    if data.contains_key("department") {
        return;
    }
    if let Some(user) = mount.store.user().filter(|user| !user.department.is_empty()) {
        data.insert("department".to_string(), user.department);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Step {
    #[default]
    Form,
    Review,
}

/// Two-step new-position form: edit, review, submit.
#[derive(Debug, Default)]
pub struct NewPositionPage {
    step: Step,
    data: FormData,
}

impl NewPositionPage {
    fn spec() -> &'static FormSpec {
        form_spec(RequestForm::NewPosition)
    }
}

impl PageModule for NewPositionPage {
    fn title(&self) -> Option<&'static str> {
        Some(Self::spec().heading)
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let spec = Self::spec();
        prefill_department(mount, &mut self.data);
        let surface = &mut *mount.container;
        match self.step {
            Step::Form => {
                surface
                    .heading(1, spec.heading)
                    .text("Step 1 of 2: Complete the form");
                render_fields(surface, spec, &self.data);
                surface
                    .button("Cancel", PageAction::navigate("/dashboard"))
                    .button("Continue to Review", PageAction::Submit);
            }
            Step::Review => {
                surface
                    .heading(1, "Review Your Request")
                    .text("Step 2 of 2: Review and submit")
                    .heading(2, "Position Details");
                for field in spec.fields {
                    let value = self.data.get(field.name).map(String::as_str).unwrap_or("");
                    surface.detail(field.label, display_value(field.kind, value));
                }
                surface
                    .button("Edit", PageAction::Edit)
                    .button("Confirm & Submit", PageAction::Confirm);
            }
        }
        Ok(())
    }

    fn handle(&mut self, action: PageAction, mount: &mut Mount<'_>) -> PageResult<Reaction> {
        let spec = Self::spec();
        match action {
            PageAction::Input { field, value } => {
                record_input(spec, &mut self.data, field, value);
                Ok(Reaction::None)
            }
            PageAction::Submit if self.step == Step::Form => {
                if toast_validation(mount, validate(spec, &self.data))?.is_none() {
                    return Ok(Reaction::None);
                }
                self.step = Step::Review;
                Ok(Reaction::Rerender)
            }
            PageAction::Edit => {
                self.step = Step::Form;
                Ok(Reaction::Rerender)
            }
            PageAction::Confirm if self.step == Step::Review => {
                let result = RequestService::new(mount.store).submit(
                    RequestForm::NewPosition,
                    &self.data,
                    mount.today,
                );
                match toast_validation(mount, result)? {
                    Some(_) => {
                        self.cleanup();
                        Ok(Reaction::Navigate("/dashboard".to_string()))
                    }
                    None => {
                        self.step = Step::Form;
                        Ok(Reaction::Rerender)
                    }
                }
            }
            PageAction::Navigate(route) => Ok(Reaction::Navigate(route)),
            _ => Ok(Reaction::None),
        }
    }

    fn cleanup(&mut self) {
        self.step = Step::Form;
        self.data.clear();
    }
}

/// Single-step request form (change, leave, offboarding).
#[derive(Debug)]
pub struct RequestFormPage {
    form: RequestForm,
    data: FormData,
}

impl RequestFormPage {
    pub fn new(form: RequestForm) -> Self {
        Self {
            form,
            data: FormData::new(),
        }
    }

    pub fn change() -> Self {
        Self::new(RequestForm::Change)
    }

    pub fn leave() -> Self {
        Self::new(RequestForm::Leave)
    }

    pub fn offboard() -> Self {
        Self::new(RequestForm::Offboard)
    }
}

impl PageModule for RequestFormPage {
    fn title(&self) -> Option<&'static str> {
        Some(form_spec(self.form).heading)
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let spec = form_spec(self.form);
        prefill_department(mount, &mut self.data);
        let surface = &mut *mount.container;
        surface.heading(1, spec.heading);
        render_fields(surface, spec, &self.data);
        surface
            .button("Cancel", PageAction::navigate("/dashboard"))
            .button("Submit Request", PageAction::Submit);
        Ok(())
    }

    fn handle(&mut self, action: PageAction, mount: &mut Mount<'_>) -> PageResult<Reaction> {
        match action {
            PageAction::Input { field, value } => {
                record_input(form_spec(self.form), &mut self.data, field, value);
                Ok(Reaction::None)
            }
            PageAction::Submit => {
                let result =
                    RequestService::new(mount.store).submit(self.form, &self.data, mount.today);
                match toast_validation(mount, result)? {
                    Some(_) => {
                        self.cleanup();
                        Ok(Reaction::Navigate("/dashboard".to_string()))
                    }
                    None => Ok(Reaction::None),
                }
            }
            PageAction::Navigate(route) => Ok(Reaction::Navigate(route)),
            _ => Ok(Reaction::None),
        }
    }

    fn cleanup(&mut self) {
        self.data.clear();
    }
}

/// Request list with filters and pagination; `/requests/{id}` shows one.
#[derive(Debug)]
pub struct RequestsPage {
    query: RequestQuery,
    page: usize,
}

impl Default for RequestsPage {
    fn default() -> Self {
        Self {
            query: RequestQuery::default(),
            page: 1,
        }
    }
}

/// Parses a label such as `Pending Review` into its enum; blank clears.
fn parse_label<T: DeserializeOwned>(value: &str) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
}

fn status_tone(status: RequestStatus) -> Tone {
    match status {
        RequestStatus::Approved => Tone::Success,
        RequestStatus::Rejected => Tone::Error,
        RequestStatus::PendingReview | RequestStatus::NeedsRevision => Tone::Warning,
        RequestStatus::Draft => Tone::Neutral,
    }
}

impl RequestsPage {
    fn render_detail(&self, surface: &mut Surface, request: Option<Request>, id: &str) {
        let Some(request) = request else {
            surface
                .heading(1, "Request Not Found")
                .text(format!("No request with id {id} exists."))
                .button("Back to Requests", PageAction::navigate("/requests"));
            return;
        };

        surface
            .heading(1, request.title.as_str())
            .push(Block::Chip {
                tone: status_tone(request.status),
                text: request.status.to_string(),
            });
        surface
            .detail("Type", request.kind.label())
            .detail("Department", request.dept.as_str())
            .detail("Requester", request.requester.as_str())
            .detail("Submitted", request.submitted.as_str());

        if !request.details.is_empty() {
            surface.heading(2, "Details");
            for (key, value) in &request.details {
                surface.detail(humanize_key(key), value.as_str());
            }
        }

        surface.heading(2, "Activity Timeline").text(format!(
            "{}: Request submitted by {}",
            request.submitted, request.requester
        ));
        for step in &request.approval_steps {
            let comment = if step.comment.is_empty() {
                String::new()
            } else {
                format!(" ({})", step.comment)
            };
            surface.text(format!(
                "{}: {} by {}{comment}",
                step.approved_at, step.action, step.approved_by
            ));
        }
        surface.button("Back to Requests", PageAction::navigate("/requests"));
    }

    fn render_list(&self, surface: &mut Surface, requests: Vec<Request>) {
        let total = requests.len();
        let page_count = total.div_ceil(ITEMS_PER_PAGE).max(1);
        let page = self.page.clamp(1, page_count);

        surface.heading(1, "All Requests");
        for (name, label, value) in [
            (
                "type",
                "Type",
                self.query.filter.kind.map(|kind| kind.label().to_string()),
            ),
            (
                "status",
                "Status",
                self.query
                    .filter
                    .status
                    .map(|status| status.label().to_string()),
            ),
            ("search", "Search", Some(self.query.search.clone())),
        ] {
            surface.push(Block::Field {
                name: name.to_string(),
                label: label.to_string(),
                value: value.unwrap_or_default(),
                required: false,
            });
        }

        if total == 0 {
            surface.notice(Tone::Neutral, "No requests match your filters.");
            return;
        }

        let rows = requests
            .iter()
            .skip((page - 1) * ITEMS_PER_PAGE)
            .take(ITEMS_PER_PAGE)
            .map(|request| {
                vec![
                    request.id.clone(),
                    request.title.clone(),
                    request.kind.to_string(),
                    request.dept.clone(),
                    request.status.to_string(),
                    request.submitted.clone(),
                ]
            })
            .collect();
        surface.table(
            &["ID", "Title", "Type", "Department", "Status", "Submitted"],
            rows,
        );
        surface.text(format!("Page {page} of {page_count} ({total} requests)"));
        if page > 1 {
            surface.button("Previous", PageAction::Page(page - 1));
        }
        if page < page_count {
            surface.button("Next", PageAction::Page(page + 1));
        }
    }
}

impl PageModule for RequestsPage {
    fn title(&self) -> Option<&'static str> {
        Some("All Requests")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        if let Some(id) = mount.param(0).map(str::to_string) {
            let request = mount.store.request(&id);
            self.render_detail(mount.container, request, &id);
            return Ok(());
        }
        let requests = RequestService::new(mount.store).list(&self.query);
        self.render_list(mount.container, requests);
        Ok(())
    }

    fn handle(&mut self, action: PageAction, _mount: &mut Mount<'_>) -> PageResult<Reaction> {
        match action {
            PageAction::Input { field, value } => {
                match field.as_str() {
                    "type" => self.query.filter.kind = parse_label::<RequestType>(&value),
                    "status" => self.query.filter.status = parse_label::<RequestStatus>(&value),
                    "dept" => {
                        self.query.filter.dept = Some(value.trim().to_string())
                            .filter(|dept| !dept.is_empty())
                    }
                    "search" => self.query.search = value,
                    _ => return Ok(Reaction::None),
                }
                self.page = 1;
                Ok(Reaction::Rerender)
            }
            PageAction::ClearFilters => {
                *self = Self::default();
                Ok(Reaction::Rerender)
            }
            PageAction::Page(page) => {
                self.page = page.max(1);
                Ok(Reaction::Rerender)
            }
            PageAction::Select(id) => Ok(Reaction::Navigate(format!("/requests/{id}"))),
            PageAction::Navigate(route) => Ok(Reaction::Navigate(route)),
            _ => Ok(Reaction::None),
        }
    }

    fn cleanup(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{display_value, parse_label};
    use crate::model::request::{RequestStatus, RequestType};
    use crate::service::request_service::FieldKind;

    #[test]
    fn review_values_are_formatted() {
        assert_eq!(display_value(FieldKind::Salary, "72000"), "$72,000");
        assert_eq!(display_value(FieldKind::Choice(&[]), "non-exempt"), "Non-exempt");
        assert_eq!(display_value(FieldKind::Date, " "), "N/A");
    }

    #[test]
    fn labels_parse_into_enums() {
        assert_eq!(
            parse_label::<RequestStatus>("Pending Review"),
            Some(RequestStatus::PendingReview)
        );
        assert_eq!(
            parse_label::<RequestType>("New Position"),
            Some(RequestType::NewPosition)
        );
        assert_eq!(parse_label::<RequestStatus>("Bogus"), None);
        assert_eq!(parse_label::<RequestStatus>(""), None);
    }
}
