//! Navigation chrome.

mod sidebar;

pub use sidebar::{NavGroup, NavItem, Sidebar};
