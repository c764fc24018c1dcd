pub mod errors;
pub mod history;
pub mod link;
pub mod matcher;
pub mod pattern;
pub mod resource;
pub mod route;
pub mod router;
pub mod types;

pub use errors::{RouterError, RouterResult};
pub use history::{Action, History, HistoryError, Location, MemoryHistory, Update};
pub use link::Link;
pub use matcher::{Branch, MatchResult, PathOptions, RouteMatcher, match_path};
pub use pattern::{MatchFlags, PathToRegex, PatternCache, PatternCompiler, PatternError};
pub use resource::{Load, Resource, ResourceError, ResourceStatus};
pub use route::Route;
pub use router::{
    Disposer, Entry, Router, RouterOptions, RouterOptionsBuilder, RouterOptionsError, Snapshot,
    Spawner, Teardown,
};
pub use types::Params;
