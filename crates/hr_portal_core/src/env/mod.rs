//! Page environment: timers, key listeners and scoped resource release.
//!
//! # Responsibility
//! - Run timers on a virtual clock advanced explicitly by the portal.
//! - Hold global key bindings on behalf of mounted pages.
//! - Release every resource a page acquired when its scope is dropped.
//!
//! # Invariants
//! - Due timers fire in deadline order, ties in scheduling order.
//! - A released scope leaves no timer or listener behind.
//!
//! # See also
//! - `crate::portal` for the event loop that drains due timers.

mod clock;
mod debounce;
mod keys;
mod scheduler;
mod scope;

pub use clock::{Clock, FixedClock, SystemClock};
pub use debounce::Debouncer;
pub use keys::{KeyRegistry, ListenerId};
pub use scheduler::{DueTimer, Scheduler, TimerId, TimerTarget};
pub use scope::ResourceScope;

/// Shared handles to the environment registries.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub scheduler: Scheduler,
    pub keys: KeyRegistry,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a resource scope bound to these registries.
    pub fn scope(&self) -> ResourceScope {
        ResourceScope::new(self.scheduler.clone(), self.keys.clone())
    }
}
