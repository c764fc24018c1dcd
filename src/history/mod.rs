mod location;
mod memory;

pub use location::Location;
pub use memory::MemoryHistory;

use crate::resource::BoxError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Push,
    Replace,
    Pop,
}

/// Delivered to listeners after the current location changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub action: Action,
    pub location: Location,
}

pub type ListenerResult = Result<(), BoxError>;
pub type Listener = Arc<dyn Fn(&Update) -> ListenerResult + Send + Sync>;
/// Detaches the listener it was returned for.
pub type Unlisten = Box<dyn FnOnce() + Send>;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("listener failed while navigating to '{location}': {cause}")]
    Listener {
        location: String,
        #[source]
        cause: BoxError,
    },
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Navigation-history service consumed by the router.
pub trait History: Send + Sync {
    fn location(&self) -> Location;

    fn listen(&self, listener: Listener) -> Unlisten;

    fn push(&self, to: &str) -> HistoryResult<()>;

    fn replace(&self, to: &str) -> HistoryResult<()>;
}
