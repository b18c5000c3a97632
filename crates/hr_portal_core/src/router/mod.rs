//! Route-to-page lifecycle driver.
//!
//! # Responsibility
//! - Resolve routes to page modules and keep exactly one page mounted.
//! - Order the lifecycle: outgoing cleanup and scope release complete before
//!   the incoming render starts.
//! - Update title, navigation highlight, last route and history.
//!
//! # Invariants
//! - Navigating to the active route (byte-for-byte) is a no-op.
//! - Unresolved routes redirect to the configured default route.
//! - A missing mount container aborts before the outgoing page is touched.
//! - Render failures are logged and toasted; the page stays mounted.

mod history;
mod table;

pub use history::{History, Location};
pub use table::{PageFactory, RouteMatch, RouteTable};

use crate::config::PortalConfig;
use crate::env::{Environment, ResourceScope};
use crate::page::{Mount, PageAction, PageModule, PageResult, Reaction};
use crate::state::StateStore;
use crate::ui::{Document, ToastQueue};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RouterResult<T> = Result<T, RouterError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The document has no mount container.
    MissingContainer { route: String },
    /// The configured default route is not registered.
    UnresolvedDefault { route: String },
}

impl Display for RouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingContainer { route } => {
                write!(f, "app container not found while navigating to `{route}`")
            }
            Self::UnresolvedDefault { route } => {
                write!(f, "default route `{route}` is not registered")
            }
        }
    }
}

impl Error for RouterError {}

/// Receives the active route after every completed navigation.
pub trait NavigationListener {
    fn route_changed(&mut self, route: &str);
}

/// Borrowed portal state a navigation or dispatch works against.
pub struct NavContext<'a> {
    pub document: &'a mut Document,
    pub store: &'a mut StateStore,
    pub env: &'a Environment,
    pub toasts: &'a mut ToastQueue,
    pub config: &'a PortalConfig,
    pub today: NaiveDate,
    pub history: &'a mut History,
    pub listener: &'a mut dyn NavigationListener,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Target equals the active route.
    Unchanged,
    Mounted { route: String, key: String },
    /// `from` did not resolve; the default route was used instead.
    Redirected { from: String, to: Box<NavOutcome> },
}

struct ActivePage {
    key: String,
    params: Vec<String>,
    page: Box<dyn PageModule>,
    scope: ResourceScope,
}

pub struct Router {
    table: RouteTable,
    current_route: Option<String>,
    active: Option<ActivePage>,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            current_route: None,
            active: None,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn current_route(&self) -> Option<&str> {
        self.current_route.as_deref()
    }

    /// Route-table key of the mounted page.
    pub fn current_key(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.key.as_str())
    }

    /// Timers and listeners held by the mounted page.
    pub fn active_resources(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |active| active.scope.active_count())
    }

    /// Mounts the page for `route`.
    ///
    /// # Errors
    /// - `MissingContainer` when the document has no mount container.
    /// - `UnresolvedDefault` when neither `route` nor the default resolves.
    pub fn navigate(
        &mut self,
        route: &str,
        record_history: bool,
        ctx: &mut NavContext<'_>,
    ) -> RouterResult<NavOutcome> {
        if self.current_route.as_deref() == Some(route) {
            debug!("event=navigate module=router status=skipped reason=same_route route={route}");
            return Ok(NavOutcome::Unchanged);
        }

        let Some(page) = self.table.instantiate(route) else {
            let fallback = ctx.config.default_route.clone();
            if fallback == route {
                error!("event=navigate module=router status=error error_code=default_unresolved route={route}");
                return Err(RouterError::UnresolvedDefault {
                    route: route.to_string(),
                });
            }
            warn!("event=navigate module=router status=redirect route={route} fallback={fallback}");
            let outcome = self.navigate(&fallback, record_history, ctx)?;
            return Ok(NavOutcome::Redirected {
                from: route.to_string(),
                to: Box::new(outcome),
            });
        };

        if ctx.document.container.is_none() {
            error!("event=navigate module=router status=error error_code=container_missing route={route}");
            return Err(RouterError::MissingContainer {
                route: route.to_string(),
            });
        }

        let started_at = Instant::now();
        if let Some(mut outgoing) = self.active.take() {
            outgoing.page.cleanup();
            outgoing.scope.release();
            debug!(
                "event=page_cleanup module=router status=ok key={}",
                outgoing.key
            );
        }

        let (key, params) = match self.table.resolve(route) {
            Some(matched) => (matched.key.to_string(), matched.params),
            None => (route.to_string(), Vec::new()),
        };
        self.current_route = Some(route.to_string());
        let mut active = ActivePage {
            key: key.clone(),
            params,
            page,
            scope: ctx.env.scope(),
        };

        if let Err(err) = render_active(&mut active, ctx) {
            report_page_error(ctx.toasts, route, "render", &err);
        }
        if let Some(title) = active.page.title() {
            ctx.document.title = ctx.config.document_title(title);
        }
        self.active = Some(active);

        ctx.listener.route_changed(route);
        if let Err(err) = ctx.store.set_last_route(route) {
            warn!("event=last_route_save module=router status=error route={route} error={err}");
        }
        if record_history && ctx.history.location() != route {
            ctx.history.push(route);
        }

        info!(
            "event=navigate module=router status=ok route={} key={} duration_ms={}",
            route,
            key,
            started_at.elapsed().as_millis()
        );
        Ok(NavOutcome::Mounted {
            route: route.to_string(),
            key,
        })
    }

    /// Delivers `action` to the mounted page.
    ///
    /// Returns the route the page asked to navigate to, if any. Page errors
    /// are logged and toasted rather than returned.
    pub fn dispatch(
        &mut self,
        action: PageAction,
        ctx: &mut NavContext<'_>,
    ) -> RouterResult<Option<String>> {
        let route = self.current_route.clone().unwrap_or_default();
        let Some(active) = self.active.as_mut() else {
            debug!("event=dispatch module=router status=skipped reason=no_page");
            return Ok(None);
        };
        let Some(container) = ctx.document.container.as_mut() else {
            error!("event=dispatch module=router status=error error_code=container_missing route={route}");
            return Err(RouterError::MissingContainer { route });
        };

        let reaction = {
            let mut mount = Mount {
                container,
                params: &active.params,
                store: &mut *ctx.store,
                scope: &mut active.scope,
                toasts: &mut *ctx.toasts,
                config: ctx.config,
                today: ctx.today,
            };
            active.page.handle(action, &mut mount)
        };

        match reaction {
            Ok(Reaction::None) => Ok(None),
            Ok(Reaction::Rerender) => {
                if let Err(err) = render_active(active, ctx) {
                    report_page_error(ctx.toasts, &route, "render", &err);
                }
                Ok(None)
            }
            Ok(Reaction::Navigate(target)) => Ok(Some(target)),
            Err(err) => {
                report_page_error(ctx.toasts, &route, "handle", &err);
                Ok(None)
            }
        }
    }

    /// Re-renders the mounted page in place.
    pub fn refresh(&mut self, ctx: &mut NavContext<'_>) -> RouterResult<()> {
        let route = self.current_route.clone().unwrap_or_default();
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if ctx.document.container.is_none() {
            return Err(RouterError::MissingContainer { route });
        }
        if let Err(err) = render_active(active, ctx) {
            report_page_error(ctx.toasts, &route, "render", &err);
        }
        Ok(())
    }

    /// Cleans up and releases the mounted page.
    pub fn unmount(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.page.cleanup();
            active.scope.release();
        }
        self.current_route = None;
    }
}

fn render_active(active: &mut ActivePage, ctx: &mut NavContext<'_>) -> PageResult<()> {
    let Some(container) = ctx.document.container.as_mut() else {
        return Ok(());
    };
    container.clear();
    let mut mount = Mount {
        container,
        params: &active.params,
        store: &mut *ctx.store,
        scope: &mut active.scope,
        toasts: &mut *ctx.toasts,
        config: ctx.config,
        today: ctx.today,
    };
    active.page.render(&mut mount)
}

fn report_page_error(toasts: &mut ToastQueue, route: &str, phase: &str, err: &dyn Error) {
    error!("event=page_{phase} module=router status=error route={route} error={err}");
    toasts.error(format!("Something went wrong: {err}"));
}
