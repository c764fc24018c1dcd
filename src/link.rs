use crate::errors::RouterResult;
use crate::history::{HistoryResult, Location};
use crate::router::Router;

/// A navigation target that warms its route before it is followed.
///
/// Hosts call [`pointer_down`](Self::pointer_down) on press and
/// [`activate`](Self::activate) on click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    to: String,
}

impl Link {
    pub fn new(to: impl Into<String>) -> Self {
        Self { to: to.into() }
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    /// Pushes the target onto the router's history.
    pub fn activate<V, D>(&self, router: &Router<V, D>) -> HistoryResult<()>
    where
        V: Send + Sync + 'static,
        D: Send + Sync + 'static,
    {
        router.history().push(&self.to)
    }

    /// Preloads the target's code and data; query and fragment are ignored.
    pub fn pointer_down<V, D>(&self, router: &Router<V, D>) -> RouterResult<()>
    where
        V: Send + Sync + 'static,
        D: Send + Sync + 'static,
    {
        let target = Location::parse(&self.to);
        router.preload(&target.pathname)
    }
}

impl From<&str> for Link {
    fn from(to: &str) -> Self {
        Self::new(to)
    }
}
