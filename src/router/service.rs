use super::snapshot::{Entry, Snapshot};
use super::subscribers::{Disposer, SubscriberRegistry};
use crate::errors::RouterResult;
use crate::history::{History, Listener, ListenerResult, Location, Unlisten, Update};
use crate::matcher::{Branch, RouteMatcher};
use crate::resource::{BoxError, Load, Resource, ResourceStatus};
use crate::route::Route;
use crate::router::RouterOptions;
use futures::FutureExt;
use futures::task::{Spawn, SpawnExt};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

/// Executor that drives element fetches started by the router.
pub type Spawner = Arc<dyn Spawn + Send + Sync>;

struct RouterInner<V, D> {
    routes: Vec<Route<V, D>>,
    matcher: RouteMatcher,
    history: Arc<dyn History>,
    spawner: Spawner,
    current: RwLock<Arc<Snapshot<V, D>>>,
    subscribers: Arc<Mutex<SubscriberRegistry<V, D>>>,
}

impl<V, D> RouterInner<V, D>
where
    V: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    #[tracing::instrument(level = "trace", skip(self, location), fields(pathname = %location.pathname))]
    fn handle_location(&self, location: &Location) -> RouterResult<()> {
        if location.pathname == self.current.read().location.pathname {
            tracing::trace!("pathname unchanged, snapshot kept");
            return Ok(());
        }

        let branches = self.matcher.match_one(&self.routes, &location.pathname)?;
        let entries = prepare_matches(branches, &self.spawner);
        let next = Arc::new(Snapshot {
            location: location.clone(),
            entries,
        });
        *self.current.write() = Arc::clone(&next);
        tracing::debug!(entries = next.entries.len(), "snapshot replaced");

        let subscribers = self.subscribers.lock().collect();
        for subscriber in subscribers {
            // a subscriber may navigate; later ones only see the newest snapshot
            if !Arc::ptr_eq(&self.current.read(), &next) {
                tracing::trace!("snapshot superseded during delivery");
                break;
            }
            subscriber(&next);
        }
        Ok(())
    }
}

/// Keeps a [`Snapshot`] in step with a [`History`].
///
/// Matching the new pathname, running `prepare` and starting element fetches
/// all happen inside the history listener, before subscribers hear about the
/// change. Subscribers run on the navigating thread with no router lock held.
pub struct Router<V, D> {
    inner: Arc<RouterInner<V, D>>,
}

impl<V, D> Clone for Router<V, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, D> Router<V, D>
where
    V: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    /// Builds the initial snapshot from the history's current location and
    /// starts listening. Fails with `NoRoute` when that location matches
    /// nothing.
    pub fn new(
        routes: Vec<Route<V, D>>,
        history: Arc<dyn History>,
        spawner: Spawner,
        options: Option<RouterOptions>,
    ) -> RouterResult<(Self, Teardown)> {
        let matcher = RouteMatcher::new(options.unwrap_or_default());
        Self::with_matcher(routes, history, spawner, matcher)
    }

    pub fn with_matcher(
        routes: Vec<Route<V, D>>,
        history: Arc<dyn History>,
        spawner: Spawner,
        matcher: RouteMatcher,
    ) -> RouterResult<(Self, Teardown)> {
        let location = history.location();
        let branches = matcher.match_one(&routes, &location.pathname)?;
        let entries = prepare_matches(branches, &spawner);
        tracing::debug!(
            pathname = %location.pathname,
            entries = entries.len(),
            "initial snapshot built"
        );

        let inner = Arc::new(RouterInner {
            routes,
            matcher,
            history: Arc::clone(&history),
            spawner,
            current: RwLock::new(Arc::new(Snapshot { location, entries })),
            subscribers: Arc::new(Mutex::new(SubscriberRegistry::new())),
        });

        let weak = Arc::downgrade(&inner);
        let listener: Listener = Arc::new(move |update: &Update| -> ListenerResult {
            match weak.upgrade() {
                Some(inner) => inner
                    .handle_location(&update.location)
                    .map_err(BoxError::from),
                None => Ok(()),
            }
        });
        let unlisten = history.listen(listener);

        Ok((Self { inner }, Teardown::new(unlisten)))
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.inner.history
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.inner.matcher
    }

    pub fn routes(&self) -> &[Route<V, D>] {
        &self.inner.routes
    }

    /// The current snapshot.
    pub fn get(&self) -> Arc<Snapshot<V, D>> {
        Arc::clone(&self.inner.current.read())
    }

    /// Runs `prepare` and starts element fetches for `pathname` without
    /// navigating.
    #[tracing::instrument(level = "trace", skip(self, pathname), fields(pathname = %pathname))]
    pub fn preload(&self, pathname: &str) -> RouterResult<()> {
        let branches = self.inner.matcher.match_one(&self.inner.routes, pathname)?;
        prepare_matches(branches, &self.inner.spawner);
        Ok(())
    }

    /// Starts element fetches for `pathname`; `prepare` is not called.
    #[tracing::instrument(level = "trace", skip(self, pathname), fields(pathname = %pathname))]
    pub fn preload_code(&self, pathname: &str) -> RouterResult<()> {
        let branches = self.inner.matcher.match_one(&self.inner.routes, pathname)?;
        for branch in branches {
            if let Some(element) = branch.route.element_ref() {
                start_load(element, &self.inner.spawner);
            }
        }
        Ok(())
    }

    /// Registers `callback` for every future snapshot replacement.
    pub fn subscribe<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&Arc<Snapshot<V, D>>) + Send + Sync + 'static,
    {
        let id = self.inner.subscribers.lock().insert(Arc::new(callback));
        let registry = Arc::downgrade(&self.inner.subscribers);
        Disposer::new(id, registry)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

impl<V, D> fmt::Debug for Router<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.inner.current.read();
        f.debug_struct("Router")
            .field("routes", &self.inner.routes.len())
            .field("pathname", &current.location.pathname)
            .field("entries", &current.entries.len())
            .field("subscribers", &self.inner.subscribers.lock().len())
            .finish()
    }
}

fn prepare_matches<V, D>(branches: Vec<Branch<'_, V, D>>, spawner: &Spawner) -> Vec<Entry<V, D>>
where
    V: Send + Sync + 'static,
{
    branches
        .into_iter()
        .map(|Branch { route, matched }| {
            let prepared = route.prepare_fn().map(|prepare| prepare(&matched.params));
            let element = route.element_ref().cloned();
            if let Some(element) = &element
                && element.status() != ResourceStatus::Resolved
            {
                start_load(element, spawner);
            }
            Entry {
                element,
                prepared,
                route_data: matched,
            }
        })
        .collect()
}

fn start_load<V>(element: &Resource<V>, spawner: &Spawner)
where
    V: Send + Sync + 'static,
{
    let Load::Started(pending) = element.load() else {
        return;
    };
    // the task only drives the fetch; the outcome is stored on the resource
    if let Err(err) = spawner.spawn(pending.map(|_| ())) {
        tracing::warn!(resource = element.id(), error = %err, "failed to spawn element fetch");
    }
}

/// Detaches a router from its history. Idempotent.
#[must_use = "dropping the teardown handle leaves no way to detach the router"]
pub struct Teardown {
    unlisten: Mutex<Option<Unlisten>>,
}

impl Teardown {
    fn new(unlisten: Unlisten) -> Self {
        Self {
            unlisten: Mutex::new(Some(unlisten)),
        }
    }

    pub fn cleanup(&self) {
        let unlisten = self.unlisten.lock().take();
        if let Some(unlisten) = unlisten {
            unlisten();
            tracing::debug!("router detached from history");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.unlisten.lock().is_some()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("attached", &self.is_attached())
            .finish()
    }
}
