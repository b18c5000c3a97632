use chrono::NaiveDate;
use hr_portal_core::page::{Mount, PageError, PageResult, Reaction};
use hr_portal_core::router::RouterError;
use hr_portal_core::service::ServiceError;
use hr_portal_core::ui::ToastKind;
use hr_portal_core::{
    FixedClock, MemoryStorage, NavOutcome, PageAction, PageModule, Portal, PortalConfig,
    PortalError, RouteTable,
};
use std::cell::RefCell;
use std::rc::Rc;

type EventLog = Rc<RefCell<Vec<String>>>;

struct TracedPage {
    name: &'static str,
    log: EventLog,
    arm_timer: bool,
    fail_render: bool,
}

impl PageModule for TracedPage {
    fn title(&self) -> Option<&'static str> {
        Some(self.name)
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        self.log.borrow_mut().push(format!("render {}", self.name));
        mount.container.heading(1, self.name);
        if self.arm_timer {
            mount.scope.set_timeout(100, PageAction::Submit);
            mount.scope.on_key("Escape", PageAction::Cancel);
        }
        if self.fail_render {
            return Err(PageError::Service(ServiceError::NotFound {
                kind: "page",
                id: self.name.to_string(),
            }));
        }
        Ok(())
    }

    fn handle(&mut self, action: PageAction, _mount: &mut Mount<'_>) -> PageResult<Reaction> {
        self.log
            .borrow_mut()
            .push(format!("{} handled {action:?}", self.name));
        Ok(Reaction::None)
    }

    fn cleanup(&mut self) {
        self.log.borrow_mut().push(format!("cleanup {}", self.name));
    }
}

fn traced_table(log: &EventLog) -> RouteTable {
    let mut table = RouteTable::new();
    for (key, name, arm_timer, fail_render) in [
        ("/a", "A", false, false),
        ("/b", "B", false, false),
        ("/timed", "Timed", true, false),
        ("/broken", "Broken", false, true),
    ] {
        let log = Rc::clone(log);
        table.register(key, move || {
            Box::new(TracedPage {
                name,
                log: Rc::clone(&log),
                arm_timer,
                fail_render,
            })
        });
    }
    table
}

fn traced_portal() -> (Portal, EventLog) {
    let log: EventLog = Rc::default();
    let config = PortalConfig {
        default_route: "/a".to_string(),
        ..PortalConfig::default()
    };
    let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
    let portal = Portal::with_routes(
        Box::new(MemoryStorage::new()),
        config,
        Box::new(FixedClock(today)),
        traced_table(&log),
    )
    .unwrap();
    (portal, log)
}

fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn outgoing_cleanup_runs_before_incoming_render() {
    let (mut portal, log) = traced_portal();
    portal.start("#/a").unwrap();
    portal.navigate("/b").unwrap();

    assert_eq!(events(&log), vec!["render A", "cleanup A", "render B"]);
    assert_eq!(portal.router().current_key(), Some("/b"));
    assert_eq!(portal.document().title, "B - HR Portal");
    assert_eq!(
        portal.document().container().and_then(|surface| surface.title()),
        Some("B")
    );
}

#[test]
fn navigating_to_active_route_is_a_no_op() {
    let (mut portal, log) = traced_portal();
    portal.start("#/a").unwrap();

    let outcome = portal.navigate("/a").unwrap();

    assert_eq!(outcome, NavOutcome::Unchanged);
    assert_eq!(events(&log), vec!["render A"]);
    assert_eq!(portal.history().len(), 1);
}

#[test]
fn unknown_route_redirects_to_default() {
    let (mut portal, _log) = traced_portal();
    portal.start("#/b").unwrap();

    let outcome = portal.navigate("/nonexistent").unwrap();

    assert_eq!(
        outcome,
        NavOutcome::Redirected {
            from: "/nonexistent".to_string(),
            to: Box::new(NavOutcome::Mounted {
                route: "/a".to_string(),
                key: "/a".to_string(),
            }),
        }
    );
    assert_eq!(portal.router().current_route(), Some("/a"));
}

#[test]
fn timers_and_keys_do_not_outlive_their_page() {
    let (mut portal, log) = traced_portal();
    portal.start("#/timed").unwrap();
    assert_eq!(portal.router().active_resources(), 2);

    portal.navigate("/a").unwrap();
    portal.advance_time(500).unwrap();

    assert_eq!(portal.press_key("Escape").unwrap(), 0);
    assert_eq!(portal.environment().scheduler.pending_count(), 0);
    assert!(!events(&log).iter().any(|event| event.contains("handled")));
}

#[test]
fn timers_fire_while_page_is_mounted() {
    let (mut portal, log) = traced_portal();
    portal.start("#/timed").unwrap();

    portal.advance_time(99).unwrap();
    assert!(!events(&log).contains(&"Timed handled Submit".to_string()));

    portal.advance_time(1).unwrap();
    assert!(events(&log).contains(&"Timed handled Submit".to_string()));

    assert_eq!(portal.press_key("Escape").unwrap(), 1);
    assert!(events(&log).contains(&"Timed handled Cancel".to_string()));
}

#[test]
fn missing_container_aborts_before_cleanup() {
    let (mut portal, log) = traced_portal();
    portal.start("#/a").unwrap();
    portal.document_mut().detach_container();

    let err = portal.navigate("/b").unwrap_err();

    match err {
        PortalError::Router(RouterError::MissingContainer { route }) => assert_eq!(route, "/b"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(events(&log), vec!["render A"]);
    assert_eq!(portal.router().current_route(), Some("/a"));
}

#[test]
fn render_failure_is_toasted_and_page_stays_mounted() {
    let (mut portal, _log) = traced_portal();
    portal.start("#/broken").unwrap();

    assert_eq!(portal.router().current_key(), Some("/broken"));
    let toast = portal.toasts().last().expect("error toast shown");
    assert_eq!(toast.kind, ToastKind::Error);
    assert!(toast.message.starts_with("Something went wrong:"));

    portal.advance_time(3000).unwrap();
    assert!(portal.toasts().visible().is_empty());
}

#[test]
fn history_back_and_forward_do_not_duplicate_entries() {
    let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
    let mut portal = Portal::open(
        Box::new(MemoryStorage::new()),
        PortalConfig::default(),
        Box::new(FixedClock(today)),
    )
    .unwrap();
    portal.start("#/dashboard").unwrap();
    portal.navigate("/requests").unwrap();

    portal.back().unwrap();
    assert_eq!(portal.router().current_route(), Some("/dashboard"));
    assert_eq!(portal.history().entries(), ["/dashboard", "/requests"]);

    portal.forward().unwrap();
    assert_eq!(portal.router().current_route(), Some("/requests"));
    assert_eq!(portal.history().len(), 2);
    assert!(portal.forward().unwrap().is_none());
}

#[test]
fn fragment_change_joins_history_so_back_returns() {
    let (mut portal, _log) = traced_portal();
    portal.start("#/a").unwrap();

    portal.open_fragment("#/b").unwrap();
    assert_eq!(portal.router().current_route(), Some("/b"));
    assert_eq!(portal.history().entries(), ["/a", "/b"]);
    assert_eq!(portal.history().location(), "/b");

    portal.back().unwrap().expect("an earlier entry exists");
    assert_eq!(portal.router().current_route(), Some("/a"));

    portal.open_fragment("#/a").unwrap();
    assert_eq!(portal.history().len(), 2);
}

#[test]
fn last_route_is_restored_on_next_start() {
    let storage = Rc::new(MemoryStorage::new());
    let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
    let open = || {
        Portal::open(
            Box::new(Rc::clone(&storage)),
            PortalConfig::default(),
            Box::new(FixedClock(today)),
        )
        .unwrap()
    };

    let mut first = open();
    first.start("").unwrap();
    first.navigate("/budget/positions").unwrap();
    drop(first);

    let mut second = open();
    second.start("").unwrap();
    assert_eq!(second.router().current_route(), Some("/budget/positions"));
    assert_eq!(second.document().title, "Position Control - HR Portal");
}

#[test]
fn sidebar_tracks_active_route() {
    let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
    let mut portal = Portal::open(
        Box::new(MemoryStorage::new()),
        PortalConfig::default(),
        Box::new(FixedClock(today)),
    )
    .unwrap();
    portal.start("").unwrap();
    portal.navigate("/approvals/pending").unwrap();

    let active = portal.sidebar().active().expect("menu item highlighted");
    assert_eq!(active.route, "/approvals/pending");

    portal.navigate("/requests/r2").unwrap();
    assert!(portal.sidebar().active().is_none());
}
