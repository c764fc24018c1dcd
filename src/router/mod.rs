mod options;
mod service;
mod snapshot;
mod subscribers;

pub use options::{DEFAULT_MAX_ROUTE_DEPTH, RouterOptions, RouterOptionsBuilder, RouterOptionsError};
pub use service::{Router, Spawner, Teardown};
pub use snapshot::{Entry, Snapshot};
pub use subscribers::{Disposer, Subscriber};
