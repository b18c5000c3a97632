//! Virtual-clock timer queue.

use crate::page::PageAction;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// What a timer delivers when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerTarget {
    /// Dispatched to the page mounted at fire time.
    Page(PageAction),
    DismissToast(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DueTimer {
    pub id: TimerId,
    pub at_ms: u64,
    pub target: TimerTarget,
}

#[derive(Debug, Default)]
struct Queue {
    now_ms: u64,
    next_id: u64,
    // (deadline, id) keeps ties in scheduling order.
    pending: BTreeMap<(u64, TimerId), TimerTarget>,
}

/// Cloneable handle to a shared timer queue.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<Queue>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    pub fn schedule(&self, delay_ms: u64, target: TimerTarget) -> TimerId {
        let mut queue = self.inner.borrow_mut();
        queue.next_id += 1;
        let id = TimerId(queue.next_id);
        let deadline = queue.now_ms.saturating_add(delay_ms);
        queue.pending.insert((deadline, id), target);
        id
    }

    /// Cancels a pending timer. Returns `false` when it already fired or was
    /// cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut queue = self.inner.borrow_mut();
        let key = queue.pending.keys().find(|(_, pending)| *pending == id).copied();
        match key {
            Some(key) => queue.pending.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner
            .borrow()
            .pending
            .keys()
            .any(|(_, pending)| *pending == id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Pops the earliest timer due at or before `until_ms` and moves the
    /// clock to its deadline.
    pub fn pop_due(&self, until_ms: u64) -> Option<DueTimer> {
        let mut queue = self.inner.borrow_mut();
        let (&(at_ms, id), _) = queue.pending.iter().next()?;
        if at_ms > until_ms {
            return None;
        }
        let target = queue.pending.remove(&(at_ms, id))?;
        queue.now_ms = queue.now_ms.max(at_ms);
        Some(DueTimer { id, at_ms, target })
    }

    /// Moves the clock forward without firing anything.
    pub fn set_now(&self, now_ms: u64) {
        let mut queue = self.inner.borrow_mut();
        queue.now_ms = queue.now_ms.max(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::{Scheduler, TimerTarget};

    #[test]
    fn pops_in_deadline_then_schedule_order() {
        let scheduler = Scheduler::new();
        let late = scheduler.schedule(300, TimerTarget::DismissToast(1));
        let first = scheduler.schedule(100, TimerTarget::DismissToast(2));
        let tie = scheduler.schedule(100, TimerTarget::DismissToast(3));

        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(1_000))
            .map(|due| due.id)
            .collect();
        assert_eq!(order, vec![first, tie, late]);
        assert_eq!(scheduler.now_ms(), 300);
    }

    #[test]
    fn timers_past_the_window_stay_pending() {
        let scheduler = Scheduler::new();
        let id = scheduler.schedule(500, TimerTarget::DismissToast(1));
        assert!(scheduler.pop_due(499).is_none());
        assert!(scheduler.is_pending(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.pending_count(), 0);
    }
}
