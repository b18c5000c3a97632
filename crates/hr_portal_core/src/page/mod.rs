//! Page module contract and the built-in pages.
//!
//! # Responsibility
//! - Define the render/handle/cleanup lifecycle every screen implements.
//! - Define the typed action vocabulary pages react to.
//! - Provide the default route table.
//!
//! # Invariants
//! - Pages reach state only through the [`Mount`] they are handed.
//! - Timers and key bindings go through `Mount::scope`, so they are released
//!   when the page unmounts.
//!
//! # See also
//! - `crate::router` for the lifecycle driver.

mod approvals;
mod budget;
mod dashboard;
mod people;
mod reports;
mod requests;
mod settings;

use crate::config::PortalConfig;
use crate::env::ResourceScope;
use crate::model::approval::Decision;
use crate::router::RouteTable;
use crate::service::ServiceError;
use crate::state::{StateError, StateStore};
use crate::ui::{Surface, ToastQueue};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use approvals::{CompletedApprovalsPage, PendingApprovalsPage};
pub use budget::{GrantsPage, PositionsPage};
pub use dashboard::DashboardPage;
pub use people::{DirectoryPage, OrgChartPage};
pub use reports::SummaryPage;
pub use requests::{NewPositionPage, RequestFormPage, RequestsPage};
pub use settings::{DelegationPage, NotificationsPage};

pub type PageResult<T> = Result<T, PageError>;

#[derive(Debug)]
pub enum PageError {
    State(StateError),
    Service(ServiceError),
}

impl Display for PageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::State(err) => Some(err),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<StateError> for PageError {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl From<ServiceError> for PageError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

/// User intent delivered to the mounted page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    Navigate(String),
    /// Form field or filter edit.
    Input { field: String, value: String },
    Submit,
    /// Return from a review step to the editable form.
    Edit,
    Confirm,
    /// Dismiss an open panel.
    Cancel,
    /// Open a record by id.
    Select(String),
    Decide {
        approval_id: String,
        decision: Decision,
        note: String,
    },
    /// Remove a list entry by index.
    Remove(usize),
    /// Commit the debounced search text.
    ApplySearch,
    /// Sort by a column key, toggling direction on repeat.
    Sort(String),
    /// Jump to a 1-based page.
    Page(usize),
    ClearFilters,
}

impl PageAction {
    pub fn navigate(route: impl Into<String>) -> Self {
        Self::Navigate(route.into())
    }

    pub fn input(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Input {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// What the router should do after a page handled an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    None,
    Rerender,
    Navigate(String),
}

/// Everything a page may touch while rendering or handling an action.
pub struct Mount<'a> {
    pub container: &'a mut Surface,
    /// Route segments after the matched key.
    pub params: &'a [String],
    pub store: &'a mut StateStore,
    pub scope: &'a mut ResourceScope,
    pub toasts: &'a mut ToastQueue,
    pub config: &'a PortalConfig,
    pub today: NaiveDate,
}

impl Mount<'_> {
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    pub fn user_name(&self) -> String {
        self.store
            .user()
            .map(|user| user.name)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// One screen's lifecycle.
pub trait PageModule {
    /// Title used for the document title, if any.
    fn title(&self) -> Option<&'static str> {
        None
    }

    /// Builds the container from current state. The container is cleared
    /// before each call.
    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()>;

    fn handle(&mut self, action: PageAction, mount: &mut Mount<'_>) -> PageResult<Reaction> {
        let _ = (action, mount);
        Ok(Reaction::None)
    }

    /// Resets page-local state. Must be idempotent.
    fn cleanup(&mut self) {}
}

/// Converts validation failures into an error toast; other errors propagate.
pub(crate) fn toast_validation<T>(
    mount: &mut Mount<'_>,
    result: Result<T, ServiceError>,
) -> PageResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ ServiceError::Validation { .. }) => {
            mount.toasts.error(err.user_message());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// `employeeName` -> `Employee Name`.
pub(crate) fn humanize_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if index == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    label
}

/// Route table with every built-in page.
pub fn default_routes() -> RouteTable {
    let mut table = RouteTable::new();
    table
        .register_page::<DashboardPage>("/dashboard")
        .register_page::<NewPositionPage>("/requests/new-position")
        .register("/requests/change", || Box::new(RequestFormPage::change()))
        .register("/requests/leave", || Box::new(RequestFormPage::leave()))
        .register("/requests/offboard", || Box::new(RequestFormPage::offboard()))
        .register_page::<RequestsPage>("/requests")
        .register_page::<PendingApprovalsPage>("/approvals/pending")
        .register_page::<CompletedApprovalsPage>("/approvals/completed")
        .register_page::<DirectoryPage>("/people/directory")
        .register_page::<OrgChartPage>("/people/orgchart")
        .register_page::<PositionsPage>("/budget/positions")
        .register_page::<GrantsPage>("/budget/grants")
        .register_page::<SummaryPage>("/reports/summary")
        .register_page::<NotificationsPage>("/settings/notifications")
        .register_page::<DelegationPage>("/settings/delegation");
    table
}
