//! Portal runtime: owns state, router, navigation chrome and the event loop.
//!
//! # Responsibility
//! - Bootstrap from a location (fragment, embed flag, last visited route).
//! - Translate navigation, history and key events into router calls.
//! - Drain due timers on the virtual clock.
//!
//! # Invariants
//! - Back/forward never record a new history entry.
//! - Timers fire only while their owning page is mounted.
//! - Toasts outlive page navigation.

use crate::config::{ConfigError, PortalConfig};
use crate::env::{Clock, Environment, TimerTarget};
use crate::nav::Sidebar;
use crate::page::{default_routes, PageAction};
use crate::router::{
    History, Location, NavContext, NavOutcome, RouteTable, Router, RouterError,
};
use crate::state::StateStore;
use crate::storage::KeyValueStorage;
use crate::ui::{Document, ToastQueue};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PortalResult<T> = Result<T, PortalError>;

#[derive(Debug)]
pub enum PortalError {
    Config(ConfigError),
    Router(RouterError),
}

impl Display for PortalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Router(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PortalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Router(err) => Some(err),
        }
    }
}

impl From<ConfigError> for PortalError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RouterError> for PortalError {
    fn from(value: RouterError) -> Self {
        Self::Router(value)
    }
}

pub struct Portal {
    store: StateStore,
    config: PortalConfig,
    env: Environment,
    toasts: ToastQueue,
    document: Document,
    history: History,
    router: Router,
    sidebar: Sidebar,
    clock: Box<dyn Clock>,
}

impl Portal {
    /// Builds a portal with every built-in page registered.
    ///
    /// # Errors
    /// - `Config` when `config` fails validation.
    pub fn open(
        storage: Box<dyn KeyValueStorage>,
        config: PortalConfig,
        clock: Box<dyn Clock>,
    ) -> PortalResult<Self> {
        Self::with_routes(storage, config, clock, default_routes())
    }

    pub fn with_routes(
        storage: Box<dyn KeyValueStorage>,
        config: PortalConfig,
        clock: Box<dyn Clock>,
        routes: RouteTable,
    ) -> PortalResult<Self> {
        config.validate()?;
        let env = Environment::new();
        let toasts = ToastQueue::new(env.scheduler.clone(), config.toast_dismiss_ms);
        let store = StateStore::open(storage);
        info!(
            "event=portal_open module=portal status=ok routes={} source={:?}",
            routes.len(),
            store.load_source()
        );
        Ok(Self {
            store,
            config,
            env,
            toasts,
            document: Document::default(),
            history: History::new(""),
            router: Router::new(routes),
            sidebar: Sidebar::new(),
            clock,
        })
    }

    /// Mounts the initial page for `location`.
    ///
    /// The route comes from the fragment, then the last visited route, then
    /// the configured default. `embed=true` hides the sidebar.
    pub fn start(&mut self, location: &str) -> PortalResult<NavOutcome> {
        let location = Location::parse(location);
        if location.embed {
            self.document.sidebar_visible = false;
        }
        let route = location
            .route()
            .map(str::to_string)
            .or_else(|| self.store.last_route())
            .unwrap_or_else(|| self.config.default_route.clone());
        info!(
            "event=portal_start module=portal status=ok route={route} embed={}",
            location.embed
        );
        self.history = History::new(route.clone());
        self.go(&route, false)
    }

    /// User-initiated navigation; records a history entry.
    pub fn navigate(&mut self, route: &str) -> PortalResult<NavOutcome> {
        self.go(route, true)
    }

    /// Reacts to an external fragment change, such as a typed URL.
    ///
    /// The changed fragment is already a session entry, so it lands in
    /// history here and the router does not record it again.
    pub fn open_fragment(&mut self, location: &str) -> PortalResult<NavOutcome> {
        let location = Location::parse(location);
        if location.embed {
            self.document.sidebar_visible = false;
        }
        let route = location
            .route()
            .map_or_else(|| self.config.default_route.clone(), str::to_string);
        if self.history.location() != route {
            self.history.push(&route);
        }
        self.go(&route, false)
    }

    /// Steps back in history; `None` at the oldest entry.
    pub fn back(&mut self) -> PortalResult<Option<NavOutcome>> {
        let Some(entry) = self.history.back().map(str::to_string) else {
            return Ok(None);
        };
        self.revisit(entry).map(Some)
    }

    pub fn forward(&mut self) -> PortalResult<Option<NavOutcome>> {
        let Some(entry) = self.history.forward().map(str::to_string) else {
            return Ok(None);
        };
        self.revisit(entry).map(Some)
    }

    /// Opens the route bound to sidebar item `id`.
    pub fn select_menu(&mut self, id: &str) -> PortalResult<Option<NavOutcome>> {
        match self.sidebar.route_for(id) {
            Some(route) => self.navigate(route).map(Some),
            None => {
                debug!("event=menu_select module=portal status=ignored item={id}");
                Ok(None)
            }
        }
    }

    pub fn toggle_group(&mut self, group_id: &str) -> bool {
        self.sidebar.toggle(group_id)
    }

    /// Delivers `action` to the mounted page and follows any navigation it
    /// requests.
    pub fn dispatch(&mut self, action: PageAction) -> PortalResult<()> {
        let target = self.with_context(|router, ctx| router.dispatch(action, ctx))?;
        if let Some(route) = target {
            self.navigate(&route)?;
        }
        Ok(())
    }

    /// Dispatches every action bound to `key`; returns how many ran.
    pub fn press_key(&mut self, key: &str) -> PortalResult<usize> {
        let actions = self.env.keys.actions_for(key);
        let count = actions.len();
        for action in actions {
            self.dispatch(action)?;
        }
        Ok(count)
    }

    /// Advances the virtual clock by `ms`, firing due timers in order.
    pub fn advance_time(&mut self, ms: u64) -> PortalResult<()> {
        let until = self.env.scheduler.now_ms().saturating_add(ms);
        while let Some(due) = self.env.scheduler.pop_due(until) {
            match due.target {
                TimerTarget::Page(action) => {
                    debug!(
                        "event=timer_fire module=portal status=ok timer={:?} at_ms={}",
                        due.id, due.at_ms
                    );
                    self.dispatch(action)?;
                }
                TimerTarget::DismissToast(id) => {
                    self.toasts.dismiss(id);
                }
            }
        }
        self.env.scheduler.set_now(until);
        Ok(())
    }

    /// Re-renders the mounted page from current state.
    pub fn refresh(&mut self) -> PortalResult<()> {
        self.with_context(|router, ctx| router.refresh(ctx))?;
        Ok(())
    }

    /// Tears down the mounted page and releases its resources.
    pub fn shutdown(&mut self) {
        self.router.unmount();
        info!("event=portal_shutdown module=portal status=ok");
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Text rendering of the mount container, empty when it is missing.
    pub fn page_text(&self) -> String {
        self.document
            .container()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    fn revisit(&mut self, entry: String) -> PortalResult<NavOutcome> {
        let route = if entry.trim().is_empty() {
            self.config.default_route.clone()
        } else {
            entry
        };
        self.go(&route, false)
    }

    fn go(&mut self, route: &str, record_history: bool) -> PortalResult<NavOutcome> {
        let outcome = self.with_context(|router, ctx| router.navigate(route, record_history, ctx))?;
        Ok(outcome)
    }

    fn with_context<R>(&mut self, run: impl FnOnce(&mut Router, &mut NavContext<'_>) -> R) -> R {
        let today = self.clock.today();
        let Self {
            store,
            config,
            env,
            toasts,
            document,
            history,
            router,
            sidebar,
            ..
        } = self;
        let mut ctx = NavContext {
            document,
            store,
            env,
            toasts,
            config,
            today,
            history,
            listener: sidebar,
        };
        run(router, &mut ctx)
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        self.router.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::Portal;
    use crate::config::PortalConfig;
    use crate::env::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn portal() -> Portal {
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).expect("valid date");
        Portal::open(
            Box::new(MemoryStorage::new()),
            PortalConfig::default(),
            Box::new(FixedClock(today)),
        )
        .expect("default config is valid")
    }

    #[test]
    fn embed_flag_hides_sidebar() {
        let mut portal = portal();
        portal
            .start("https://hr.example.edu/#/people/directory?embed=true")
            .expect("start succeeds");
        assert!(!portal.document().sidebar_visible);
        assert_eq!(portal.router().current_key(), Some("/people/directory"));
    }

    #[test]
    fn empty_fragment_starts_on_default_route() {
        let mut portal = portal();
        portal.start("").expect("start succeeds");
        assert_eq!(portal.router().current_route(), Some("/dashboard"));
        assert!(portal.document().sidebar_visible);
        assert_eq!(portal.document().title, "Dashboard - HR Portal");
    }

    #[test]
    fn menu_selection_navigates_and_groups_toggle() {
        let mut portal = portal();
        portal.start("#/dashboard").expect("start succeeds");

        let outcome = portal.select_menu("requests-leave").expect("navigation succeeds");
        assert!(outcome.is_some());
        assert_eq!(portal.router().current_route(), Some("/requests/leave"));
        assert!(portal.select_menu("missing").expect("ignored").is_none());

        let was_open = portal.sidebar().is_expanded("people");
        assert_eq!(portal.toggle_group("people"), !was_open);

        portal.shutdown();
        assert_eq!(portal.router().current_route(), None);
    }
}
