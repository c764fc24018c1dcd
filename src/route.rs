use crate::resource::Resource;
use crate::types::Params;
use std::fmt;
use std::sync::Arc;

pub type PrepareFn<D> = Arc<dyn Fn(&Params) -> D + Send + Sync>;

/// One node of the route tree.
///
/// `V` is the payload of the code-split view, `D` whatever `prepare` returns
/// (commonly a handle to data that is still loading).
pub struct Route<V, D> {
    path: Option<Vec<String>>,
    exact: bool,
    strict: Option<bool>,
    sensitive: Option<bool>,
    children: Vec<Route<V, D>>,
    element: Option<Resource<V>>,
    prepare: Option<PrepareFn<D>>,
}

impl<V, D> Default for Route<V, D> {
    fn default() -> Self {
        Self {
            path: None,
            exact: false,
            strict: None,
            sensitive: None,
            children: Vec::new(),
            element: None,
            prepare: None,
        }
    }
}

impl<V, D> Route<V, D> {
    /// A route without a pattern of its own; it reuses its parent's match.
    pub fn layout() -> Self {
        Self::default()
    }

    pub fn new<S: Into<String>>(path: S) -> Self {
        Self::default().path(path)
    }

    /// An empty pattern leaves the route pathless.
    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        let path = path.into();
        self.path = (!path.is_empty()).then(|| vec![path]);
        self
    }

    /// Alternative patterns, tried in order. Empty patterns are dropped; a
    /// list left empty makes the route pathless, like `path("")`.
    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths
            .into_iter()
            .map(Into::into)
            .filter(|path: &String| !path.is_empty())
            .collect();
        self.path = (!paths.is_empty()).then_some(paths);
        self
    }

    pub fn exact(mut self, value: bool) -> Self {
        self.exact = value;
        self
    }

    pub fn strict(mut self, value: bool) -> Self {
        self.strict = Some(value);
        self
    }

    pub fn sensitive(mut self, value: bool) -> Self {
        self.sensitive = Some(value);
        self
    }

    pub fn child(mut self, child: Route<V, D>) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Route<V, D>>,
    {
        self.children.extend(children);
        self
    }

    pub fn element(mut self, element: Resource<V>) -> Self {
        self.element = Some(element);
        self
    }

    pub fn prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&Params) -> D + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    pub fn patterns(&self) -> Option<&[String]> {
        self.path.as_deref()
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn strict_flag(&self) -> Option<bool> {
        self.strict
    }

    pub fn sensitive_flag(&self) -> Option<bool> {
        self.sensitive
    }

    pub fn child_routes(&self) -> &[Route<V, D>] {
        &self.children
    }

    pub fn element_ref(&self) -> Option<&Resource<V>> {
        self.element.as_ref()
    }

    pub fn prepare_fn(&self) -> Option<&PrepareFn<D>> {
        self.prepare.as_ref()
    }
}

impl<V, D> fmt::Debug for Route<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("exact", &self.exact)
            .field("strict", &self.strict)
            .field("sensitive", &self.sensitive)
            .field("children", &self.children)
            .field("element", &self.element.as_ref().map(Resource::id))
            .field("prepare", &self.prepare.is_some())
            .finish()
    }
}
