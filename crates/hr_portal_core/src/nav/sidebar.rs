//! Sidebar menu with active-route highlight.
//!
//! # Invariants
//! - At most one item is active, matched by exact route.
//! - Activating an item inside a group expands that group.

use crate::router::NavigationListener;
use crate::ui::Surface;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub id: &'static str,
    pub label: &'static str,
    pub route: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavGroup {
    pub id: &'static str,
    /// `None` for the ungrouped home entry.
    pub label: Option<&'static str>,
    pub items: &'static [NavItem],
}

const fn item(id: &'static str, label: &'static str, route: &'static str) -> NavItem {
    NavItem { id, label, route }
}

const MENU: &[NavGroup] = &[
    NavGroup {
        id: "home",
        label: None,
        items: &[item("home", "Home", "/dashboard")],
    },
    NavGroup {
        id: "requests",
        label: Some("My Requests"),
        items: &[
            item("requests-new", "New Position", "/requests/new-position"),
            item("requests-change", "Change to Existing Employee", "/requests/change"),
            item("requests-leave", "Sabbatical / Leave", "/requests/leave"),
            item("requests-offboard", "Termination / Offboarding", "/requests/offboard"),
            item("requests-all", "All Requests", "/requests"),
        ],
    },
    NavGroup {
        id: "approvals",
        label: Some("Approvals"),
        items: &[
            item("approvals-pending", "Pending", "/approvals/pending"),
            item("approvals-completed", "Completed", "/approvals/completed"),
        ],
    },
    NavGroup {
        id: "people",
        label: Some("People & Structure"),
        items: &[
            item("people-directory", "Directory", "/people/directory"),
            item("people-orgchart", "Org Chart", "/people/orgchart"),
        ],
    },
    NavGroup {
        id: "budget",
        label: Some("Budget & Positions"),
        items: &[
            item("budget-positions", "Position Control", "/budget/positions"),
            item("budget-grants", "Grant-Funded Roles", "/budget/grants"),
        ],
    },
    NavGroup {
        id: "reports",
        label: Some("Reports"),
        items: &[item("reports-summary", "Summary", "/reports/summary")],
    },
    NavGroup {
        id: "settings",
        label: Some("Settings"),
        items: &[
            item("settings-notifications", "Notifications", "/settings/notifications"),
            item("settings-delegation", "Delegation / Proxy", "/settings/delegation"),
        ],
    },
];

#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    active: Option<NavItem>,
    expanded: BTreeSet<&'static str>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &'static [NavGroup] {
        MENU
    }

    pub fn items(&self) -> impl Iterator<Item = &'static NavItem> {
        MENU.iter().flat_map(|group| group.items.iter())
    }

    pub fn active(&self) -> Option<&NavItem> {
        self.active.as_ref()
    }

    pub fn is_expanded(&self, group_id: &str) -> bool {
        self.expanded.contains(group_id)
    }

    /// Flips a group open or closed; returns the new state.
    pub fn toggle(&mut self, group_id: &str) -> bool {
        let Some(group) = MENU.iter().find(|group| group.id == group_id) else {
            return false;
        };
        if self.expanded.remove(group.id) {
            false
        } else {
            self.expanded.insert(group.id);
            true
        }
    }

    /// Route bound to the menu item `id`.
    pub fn route_for(&self, id: &str) -> Option<&'static str> {
        self.items().find(|item| item.id == id).map(|item| item.route)
    }

    pub fn render(&self) -> Surface {
        let mut surface = Surface::new("sidebar");
        for group in MENU {
            if let Some(label) = group.label {
                let marker = if self.is_expanded(group.id) { "v" } else { ">" };
                surface.text(format!("{marker} {label}"));
            }
            for item in group.items {
                let active = self.active.is_some_and(|active| active.id == item.id);
                let bullet = if active { "*" } else { "-" };
                surface.text(format!("  {bullet} {} ({})", item.label, item.route));
            }
        }
        surface
    }
}

impl NavigationListener for Sidebar {
    fn route_changed(&mut self, route: &str) {
        self.active = None;
        for group in MENU {
            if let Some(item) = group.items.iter().find(|item| item.route == route) {
                self.active = Some(*item);
                if group.label.is_some() {
                    self.expanded.insert(group.id);
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sidebar;
    use crate::router::NavigationListener;

    #[test]
    fn route_change_highlights_and_expands_group() {
        let mut sidebar = Sidebar::new();
        sidebar.route_changed("/approvals/completed");
        assert_eq!(sidebar.active().map(|item| item.id), Some("approvals-completed"));
        assert!(sidebar.is_expanded("approvals"));
        assert!(sidebar.render().contains_text("* Completed"));

        sidebar.route_changed("/requests/r5");
        assert!(sidebar.active().is_none());
        assert!(sidebar.is_expanded("approvals"));
    }

    #[test]
    fn toggle_flips_known_groups_only() {
        let mut sidebar = Sidebar::new();
        assert!(sidebar.toggle("people"));
        assert!(!sidebar.toggle("people"));
        assert!(!sidebar.toggle("missing"));
    }
}
