//! Transient notifications with scheduled dismissal.

use crate::env::{Scheduler, TimerTarget};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Visible toasts; each one schedules its own dismissal on show.
#[derive(Debug)]
pub struct ToastQueue {
    scheduler: Scheduler,
    dismiss_ms: u64,
    next_id: u64,
    visible: Vec<Toast>,
    shown: usize,
}

impl ToastQueue {
    pub fn new(scheduler: Scheduler, dismiss_ms: u64) -> Self {
        Self {
            scheduler,
            dismiss_ms,
            next_id: 0,
            visible: Vec::new(),
            shown: 0,
        }
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.visible.push(Toast {
            id,
            kind,
            message: message.into(),
        });
        self.shown += 1;
        self.scheduler
            .schedule(self.dismiss_ms, TimerTarget::DismissToast(id));
        debug!("event=toast_show module=ui status=ok toast_id={id} kind={kind:?}");
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastKind::Error, message)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.visible.len();
        self.visible.retain(|toast| toast.id != id);
        before != self.visible.len()
    }

    pub fn visible(&self) -> &[Toast] {
        &self.visible
    }

    pub fn last(&self) -> Option<&Toast> {
        self.visible.last()
    }

    /// Total toasts shown since creation, dismissed ones included.
    pub fn shown_count(&self) -> usize {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::{ToastKind, ToastQueue};
    use crate::env::{Scheduler, TimerTarget};

    #[test]
    fn show_schedules_dismissal() {
        let scheduler = Scheduler::new();
        let mut toasts = ToastQueue::new(scheduler.clone(), 3000);
        let id = toasts.error("Please fill in the hours field");

        assert_eq!(toasts.last().map(|toast| toast.kind), Some(ToastKind::Error));
        let due = scheduler.pop_due(3000).expect("dismiss timer due");
        assert_eq!(due.target, TimerTarget::DismissToast(id));
        assert!(toasts.dismiss(id));
        assert!(toasts.visible().is_empty());
        assert_eq!(toasts.shown_count(), 1);
    }
}
