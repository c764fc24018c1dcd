use super::{Action, History, HistoryError, HistoryResult, Listener, Location, Unlisten, Update};
use parking_lot::{Mutex, ReentrantMutex};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

struct Stack {
    entries: Vec<Location>,
    index: usize,
    /// Bumped on every applied navigation.
    generation: u64,
}

impl Stack {
    fn current(&self) -> &Location {
        &self.entries[self.index]
    }
}

/// In-process history stack, for hosts without a browser history.
///
/// Listeners run synchronously after the stack has changed; the first
/// listener error stops delivery and is returned to the navigating caller.
///
/// Navigations are serialized: a navigation from another thread waits until
/// every listener has seen the current one. A listener may navigate again
/// from inside its callback.
pub struct MemoryHistory {
    navigation: ReentrantMutex<()>,
    stack: Mutex<Stack>,
    listeners: Arc<Mutex<ListenerRegistry>>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            navigation: ReentrantMutex::new(()),
            stack: Mutex::new(Stack {
                entries: vec![Location::parse(initial)],
                index: 0,
                generation: 0,
            }),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    /// Moves `delta` entries through the stack; out-of-range moves are ignored.
    pub fn go(&self, delta: isize) -> HistoryResult<()> {
        self.navigate(Action::Pop, |stack| {
            let target = stack.index.checked_add_signed(delta)?;
            if delta == 0 || target >= stack.entries.len() {
                return None;
            }
            stack.index = target;
            Some(stack.current().clone())
        })
    }

    pub fn back(&self) -> HistoryResult<()> {
        self.go(-1)
    }

    pub fn forward(&self) -> HistoryResult<()> {
        self.go(1)
    }

    pub fn len(&self) -> usize {
        self.stack.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.lock().entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.stack.lock().index
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().listeners.len()
    }

    /// Applies `change` and notifies listeners while holding the navigation
    /// turn; `None` from `change` means nothing moved. A navigation started
    /// by a listener supersedes the one being delivered: later listeners only
    /// see the newer location.
    fn navigate<F>(&self, action: Action, change: F) -> HistoryResult<()>
    where
        F: FnOnce(&mut Stack) -> Option<Location>,
    {
        let _turn = self.navigation.lock();
        let (location, generation) = {
            let mut stack = self.stack.lock();
            let Some(location) = change(&mut stack) else {
                return Ok(());
            };
            stack.generation += 1;
            (location, stack.generation)
        };
        self.notify(action, location, generation)
    }

    fn notify(&self, action: Action, location: Location, generation: u64) -> HistoryResult<()> {
        let listeners: Vec<Listener> = self.listeners.lock().listeners.values().cloned().collect();
        let update = Update { action, location };

        for listener in listeners {
            if self.stack.lock().generation != generation {
                tracing::trace!(location = %update.location, "superseded by a nested navigation");
                break;
            }
            listener(&update).map_err(|cause| HistoryError::Listener {
                location: update.location.href(),
                cause,
            })?;
        }
        Ok(())
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.stack.lock().current().clone()
    }

    fn listen(&self, listener: Listener) -> Unlisten {
        let id = {
            let mut registry = self.listeners.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.insert(id, listener);
            id
        };

        let registry = Arc::downgrade(&self.listeners);
        Box::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().listeners.remove(&id);
            }
        })
    }

    fn push(&self, to: &str) -> HistoryResult<()> {
        let location = Location::parse(to);
        tracing::trace!(to, "history push");
        self.navigate(Action::Push, |stack| {
            let next = stack.index + 1;
            stack.entries.truncate(next);
            stack.entries.push(location.clone());
            stack.index = next;
            Some(location)
        })
    }

    fn replace(&self, to: &str) -> HistoryResult<()> {
        let location = Location::parse(to);
        tracing::trace!(to, "history replace");
        self.navigate(Action::Replace, |stack| {
            let index = stack.index;
            stack.entries[index] = location.clone();
            Some(location)
        })
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = self.stack.lock();
        f.debug_struct("MemoryHistory")
            .field("entries", &stack.entries)
            .field("index", &stack.index)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
