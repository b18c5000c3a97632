//! Core of the HR admin portal.
//! Pages, routing, workflow rules and persistence live here; front ends only
//! feed events in and read the rendered document back.

pub mod config;
pub mod db;
pub mod env;
pub mod logging;
pub mod model;
pub mod nav;
pub mod page;
pub mod portal;
pub mod router;
pub mod service;
pub mod state;
pub mod storage;
pub mod ui;

pub use config::{ApprovalPolicy, ConfigError, PortalConfig};
pub use env::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use page::{default_routes, PageAction, PageModule};
pub use portal::{Portal, PortalError, PortalResult};
pub use router::{NavOutcome, RouteTable, Router, RouterError};
pub use state::{LoadSource, StateError, StateStore};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
