//! Global key bindings registered by mounted pages.

use crate::page::PageAction;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Bindings {
    next_id: u64,
    by_id: BTreeMap<ListenerId, (String, PageAction)>,
}

/// Cloneable handle to the shared key-binding table.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    inner: Rc<RefCell<Bindings>>,
}

impl KeyRegistry {
    pub fn bind(&self, key: &str, action: PageAction) -> ListenerId {
        let mut bindings = self.inner.borrow_mut();
        bindings.next_id += 1;
        let id = ListenerId(bindings.next_id);
        bindings.by_id.insert(id, (key.to_string(), action));
        id
    }

    pub fn unbind(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().by_id.remove(&id).is_some()
    }

    /// Actions bound to `key`, in registration order.
    pub fn actions_for(&self, key: &str) -> Vec<PageAction> {
        self.inner
            .borrow()
            .by_id
            .values()
            .filter(|(bound, _)| bound == key)
            .map(|(_, action)| action.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
