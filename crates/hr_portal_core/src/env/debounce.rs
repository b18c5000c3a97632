//! Trailing-edge debounce on top of a [`ResourceScope`].

use super::scheduler::TimerId;
use super::scope::ResourceScope;
use crate::page::PageAction;

/// Delivers only the last action triggered within `delay_ms`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Supersedes any pending action and schedules `action`.
    pub fn trigger(&mut self, scope: &mut ResourceScope, action: PageAction) {
        if let Some(previous) = self.pending.take() {
            scope.clear_timeout(previous);
        }
        self.pending = Some(scope.set_timeout(self.delay_ms, action));
    }

    pub fn cancel(&mut self, scope: &mut ResourceScope) {
        if let Some(previous) = self.pending.take() {
            scope.clear_timeout(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use crate::env::{Environment, TimerTarget};
    use crate::page::PageAction;

    #[test]
    fn later_trigger_supersedes_pending_one() {
        let env = Environment::new();
        let mut scope = env.scope();
        let mut debouncer = Debouncer::new(200);

        debouncer.trigger(&mut scope, PageAction::input("search", "al"));
        env.scheduler.set_now(150);
        debouncer.trigger(&mut scope, PageAction::input("search", "ali"));

        assert!(env.scheduler.pop_due(200).is_none());
        let due = env.scheduler.pop_due(350).expect("debounced timer fires");
        assert_eq!(due.target, TimerTarget::Page(PageAction::input("search", "ali")));
        assert_eq!(env.scheduler.pending_count(), 0);
    }
}
