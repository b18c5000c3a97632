//! Resource scope owned by one mounted page.

use super::keys::{KeyRegistry, ListenerId};
use super::scheduler::{Scheduler, TimerId, TimerTarget};
use crate::page::PageAction;
use log::debug;

/// Tracks timers and key listeners acquired by a page.
///
/// Dropping the scope (or calling [`ResourceScope::release`]) cancels every
/// timer still pending and unbinds every listener.
#[derive(Debug)]
pub struct ResourceScope {
    scheduler: Scheduler,
    keys: KeyRegistry,
    timers: Vec<TimerId>,
    listeners: Vec<ListenerId>,
}

impl ResourceScope {
    pub(crate) fn new(scheduler: Scheduler, keys: KeyRegistry) -> Self {
        Self {
            scheduler,
            keys,
            timers: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Schedules `action` for the current page after `delay_ms`.
    pub fn set_timeout(&mut self, delay_ms: u64, action: PageAction) -> TimerId {
        let id = self.scheduler.schedule(delay_ms, TimerTarget::Page(action));
        self.timers.push(id);
        id
    }

    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.timers.retain(|tracked| *tracked != id);
        self.scheduler.cancel(id)
    }

    pub fn on_key(&mut self, key: &str, action: PageAction) -> ListenerId {
        let id = self.keys.bind(key, action);
        self.listeners.push(id);
        id
    }

    pub fn remove_key(&mut self, id: ListenerId) -> bool {
        self.listeners.retain(|tracked| *tracked != id);
        self.keys.unbind(id)
    }

    /// Resources still held: pending timers plus bound listeners.
    pub fn active_count(&self) -> usize {
        let timers = self
            .timers
            .iter()
            .filter(|id| self.scheduler.is_pending(**id))
            .count();
        timers + self.listeners.len()
    }

    /// Releases everything. Safe to call more than once.
    pub fn release(&mut self) {
        let timers = self
            .timers
            .drain(..)
            .filter(|id| self.scheduler.cancel(*id))
            .count();
        let listeners = self
            .listeners
            .drain(..)
            .filter(|id| self.keys.unbind(*id))
            .count();
        if timers + listeners > 0 {
            debug!("event=scope_release module=env status=ok timers={timers} listeners={listeners}");
        }
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use crate::page::PageAction;

    #[test]
    fn dropping_scope_cancels_timers_and_listeners() {
        let env = Environment::new();
        {
            let mut scope = env.scope();
            scope.set_timeout(200, PageAction::ApplySearch);
            scope.on_key("Escape", PageAction::Navigate("/dashboard".to_string()));
            assert_eq!(scope.active_count(), 2);
        }
        assert_eq!(env.scheduler.pending_count(), 0);
        assert!(env.keys.is_empty());
    }

    #[test]
    fn release_ignores_fired_timers() {
        let env = Environment::new();
        let mut scope = env.scope();
        scope.set_timeout(10, PageAction::ApplySearch);
        assert!(env.scheduler.pop_due(10).is_some());
        assert_eq!(scope.active_count(), 0);
        scope.release();
        scope.release();
        assert_eq!(env.scheduler.pending_count(), 0);
    }
}
