mod common;

use common::{QueueSpawner, counted_view};
use futures::executor::block_on;
use futures::task::SpawnExt;
use preload_router::resource::BoxError;
use preload_router::{Load, Resource, ResourceError, ResourceStatus};
use std::future::IntoFuture;
use std::sync::atomic::Ordering;

#[test]
fn resource_when_loaded_repeatedly_then_fetches_once() {
    let (view, calls) = counted_view("Dashboard");
    assert_eq!(view.status(), ResourceStatus::Unrequested);

    let first = view.load();
    let second = view.load();
    assert!(first.is_started());
    assert!(matches!(second, Load::InFlight(_)));

    let value = block_on(second.into_future()).expect("load should succeed");
    assert_eq!(*value, "Dashboard");
    assert!(matches!(view.load(), Load::Ready(Ok(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn resource_when_clone_loads_then_original_observes_result() {
    let (view, calls) = counted_view("Settings");
    let shared = view.clone();

    block_on(shared.load().into_future()).unwrap();

    assert_eq!(view.status(), ResourceStatus::Resolved);
    assert_eq!(*view.get().unwrap(), "Settings");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn resource_when_fetch_is_spawned_then_resolves_after_executor_runs() {
    let (view, _) = counted_view("Profile");
    let spawner = QueueSpawner::default();

    let Load::Started(pending) = view.load() else {
        panic!("first load should start the fetch");
    };
    spawner
        .spawn(async move {
            let _ = pending.await;
        })
        .expect("queue accepts tasks");

    assert!(matches!(view.get(), Err(ResourceError::NotReady { .. })));
    spawner.run_all();
    assert_eq!(*view.get().unwrap(), "Profile");
}

#[test]
fn resource_when_loader_fails_then_failure_is_sticky() {
    let view: Resource<&'static str> =
        Resource::new("Broken", || async { Err::<&'static str, _>(BoxError::from("404")) });

    let err = block_on(view.load().into_future()).expect_err("load should fail");
    assert_eq!(err.to_string(), "resource 'Broken' failed to load: 404");

    assert!(matches!(view.load(), Load::Ready(Err(ResourceError::LoadFailed { .. }))));
    assert_eq!(view.id(), "Broken");
}
