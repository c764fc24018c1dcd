mod params;
mod path;
pub mod resolver;

pub(crate) use params::captures_to_params;
pub use path::{MatchResult, PathOptions, match_path};
pub use resolver::{Branch, RouteMatcher};
