#![allow(dead_code)]

use futures::executor::block_on;
use futures::task::{FutureObj, Spawn, SpawnError};
use parking_lot::Mutex;
use preload_router::history::MemoryHistory;
use preload_router::{Params, Resource, Route, Router, Teardown};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub type View = &'static str;
pub type Data = String;
pub type TestRoute = Route<View, Data>;

/// Queues spawned tasks until the test drives them.
#[derive(Default)]
pub struct QueueSpawner {
    queue: Mutex<Vec<FutureObj<'static, ()>>>,
}

impl QueueSpawner {
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn run_all(&self) {
        let tasks = std::mem::take(&mut *self.queue.lock());
        for task in tasks {
            block_on(task);
        }
    }
}

impl Spawn for QueueSpawner {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.queue.lock().push(future);
        Ok(())
    }
}

/// Rejects every task, like an executor that has shut down.
pub struct ClosedSpawner;

impl Spawn for ClosedSpawner {
    fn spawn_obj(&self, _future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        Err(SpawnError::shutdown())
    }
}

/// A view whose loader counts how often it runs.
pub fn counted_view(id: &'static str) -> (Resource<View>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let resource = Resource::new(id, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, Infallible>(id) }
    });
    (resource, calls)
}

/// Records every `prepare` call as `label:key=value,...` with sorted keys.
#[derive(Clone, Default)]
pub struct PrepareLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl PrepareLog {
    pub fn recorder(&self, label: &'static str) -> impl Fn(&Params) -> Data + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |params: &Params| {
            let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            pairs.sort();
            let entry = format!("{label}:{}", pairs.join(","));
            calls.lock().push(entry.clone());
            entry
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

pub struct Harness {
    pub router: Router<View, Data>,
    pub teardown: Teardown,
    pub history: Arc<MemoryHistory>,
    pub spawner: Arc<QueueSpawner>,
}

pub fn start(routes: Vec<TestRoute>, initial: &str) -> Harness {
    let history = Arc::new(MemoryHistory::new(initial));
    let spawner = Arc::new(QueueSpawner::default());
    let (router, teardown) = Router::new(
        routes,
        history.clone(),
        spawner.clone(),
        None,
    )
    .expect("initial location should match");

    Harness {
        router,
        teardown,
        history,
        spawner,
    }
}
