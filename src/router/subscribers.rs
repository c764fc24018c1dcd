use super::snapshot::Snapshot;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

pub type Subscriber<V, D> = Arc<dyn Fn(&Arc<Snapshot<V, D>>) + Send + Sync>;

/// Subscribers keyed by registration order.
pub(crate) struct SubscriberRegistry<V, D> {
    next_id: u64,
    subscribers: BTreeMap<u64, Subscriber<V, D>>,
}

impl<V, D> SubscriberRegistry<V, D> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, subscriber: Subscriber<V, D>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, subscriber);
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Clones the current set so callbacks can run without the lock held.
    pub(crate) fn collect(&self) -> Vec<Subscriber<V, D>> {
        self.subscribers.values().cloned().collect()
    }
}

pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<V, D> Unsubscribe for Mutex<SubscriberRegistry<V, D>> {
    fn unsubscribe(&self, id: u64) {
        if self.lock().remove(id) {
            tracing::trace!(subscriber = id, "subscriber removed");
        }
    }
}

/// Removes one subscription. Calling it again, or after the router is gone,
/// does nothing.
pub struct Disposer {
    id: u64,
    registry: Weak<dyn Unsubscribe>,
}

impl Disposer {
    pub(crate) fn new(id: u64, registry: Weak<dyn Unsubscribe>) -> Self {
        Self { id, registry }
    }

    pub fn dispose(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("id", &self.id)
            .field("live", &(self.registry.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispose_when_repeated_then_removes_once() {
        let registry: Arc<Mutex<SubscriberRegistry<(), ()>>> =
            Arc::new(Mutex::new(SubscriberRegistry::new()));
        let first = registry.lock().insert(Arc::new(|_: &Arc<Snapshot<(), ()>>| {}));
        let second = registry.lock().insert(Arc::new(|_: &Arc<Snapshot<(), ()>>| {}));
        assert_ne!(first, second);

        let weak: Weak<Mutex<SubscriberRegistry<(), ()>>> = Arc::downgrade(&registry);
        let disposer = Disposer::new(first, weak);
        disposer.dispose();
        disposer.dispose();

        assert_eq!(registry.lock().len(), 1);
    }

    #[test]
    fn dispose_when_registry_dropped_then_is_noop() {
        let registry: Arc<Mutex<SubscriberRegistry<(), ()>>> =
            Arc::new(Mutex::new(SubscriberRegistry::new()));
        let id = registry.lock().insert(Arc::new(|_: &Arc<Snapshot<(), ()>>| {}));
        let weak: Weak<Mutex<SubscriberRegistry<(), ()>>> = Arc::downgrade(&registry);
        let disposer = Disposer::new(id, weak);

        drop(registry);
        disposer.dispose();
    }
}
