use crate::history::Location;
use crate::matcher::MatchResult;
use crate::resource::Resource;

/// One matched level of the route tree, ready to render.
#[derive(Debug)]
pub struct Entry<V, D> {
    pub element: Option<Resource<V>>,
    pub prepared: Option<D>,
    pub route_data: MatchResult,
}

/// What the router considers current. Replaced wholesale, never mutated.
#[derive(Debug)]
pub struct Snapshot<V, D> {
    pub location: Location,
    pub entries: Vec<Entry<V, D>>,
}

impl<V, D> Snapshot<V, D> {
    pub fn pathname(&self) -> &str {
        &self.location.pathname
    }

    /// The deepest matched entry.
    pub fn leaf(&self) -> Option<&Entry<V, D>> {
        self.entries.last()
    }
}
