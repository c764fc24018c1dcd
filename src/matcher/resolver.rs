use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::path::{MatchResult, PathOptions, match_path};
use crate::errors::{RouterError, RouterResult};
use crate::pattern::{PathToRegex, PatternCache, PatternCompiler};
use crate::route::Route;
use crate::router::RouterOptions;

/// A matched route paired with its match result.
pub struct Branch<'r, V, D> {
    pub route: &'r Route<V, D>,
    pub matched: MatchResult,
}

impl<V, D> fmt::Debug for Branch<'_, V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("route", &self.route.patterns())
            .field("matched", &self.matched)
            .finish()
    }
}

/// Walks a route tree, compiling patterns through a shared [`PatternCache`].
#[derive(Debug)]
pub struct RouteMatcher {
    cache: PatternCache,
    options: RouterOptions,
}

impl RouteMatcher {
    pub fn new(options: RouterOptions) -> Self {
        Self::with_compiler(options, Arc::new(PathToRegex))
    }

    pub fn with_compiler(options: RouterOptions, compiler: Arc<dyn PatternCompiler>) -> Self {
        Self {
            cache: PatternCache::new(compiler, options.pattern_cache_limit),
            options,
        }
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Matched branches from root to leaf; empty when nothing matched.
    #[tracing::instrument(level = "trace", skip(self, routes), fields(routes = routes.len() as u64))]
    pub fn match_tree<'r, V, D>(
        &self,
        routes: &'r [Route<V, D>],
        pathname: &str,
    ) -> RouterResult<Vec<Branch<'r, V, D>>> {
        let mut branch = Vec::new();
        self.collect(routes, pathname, &mut branch, 1)?;
        Ok(branch)
    }

    /// Like [`match_tree`](Self::match_tree) but an empty result is an error.
    pub fn match_one<'r, V, D>(
        &self,
        routes: &'r [Route<V, D>],
        pathname: &str,
    ) -> RouterResult<Vec<Branch<'r, V, D>>> {
        let branch = self.match_tree(routes, pathname)?;
        if branch.is_empty() {
            return Err(RouterError::NoRoute {
                pathname: pathname.to_string(),
            });
        }
        Ok(branch)
    }

    fn collect<'r, V, D>(
        &self,
        routes: &'r [Route<V, D>],
        pathname: &str,
        branch: &mut Vec<Branch<'r, V, D>>,
        depth: usize,
    ) -> RouterResult<()> {
        if depth > self.options.max_route_depth {
            return Err(RouterError::RouteDepthExceeded {
                limit: self.options.max_route_depth,
                pathname: pathname.to_string(),
            });
        }

        for route in routes {
            let parent = branch.last().map(|b| &b.matched);
            let matched = match route.patterns() {
                Some(patterns) => self.match_route(route, patterns, parent, pathname)?,
                None => Some(
                    parent
                        .cloned()
                        .unwrap_or_else(|| MatchResult::root(pathname)),
                ),
            };

            // siblings are a priority order: the first match ends the search
            if let Some(matched) = matched {
                branch.push(Branch { route, matched });
                if !route.child_routes().is_empty() {
                    self.collect(route.child_routes(), pathname, branch, depth + 1)?;
                }
                return Ok(());
            }
        }

        Ok(())
    }

    fn match_route<V, D>(
        &self,
        route: &Route<V, D>,
        patterns: &[String],
        parent: Option<&MatchResult>,
        pathname: &str,
    ) -> RouterResult<Option<MatchResult>> {
        let base = parent.map(|m| m.path.as_str());
        let resolved: Vec<Cow<'_, str>> = patterns
            .iter()
            .map(|pattern| resolve_pattern(base, pattern))
            .collect();

        let options = PathOptions {
            exact: route.is_exact(),
            strict: route
                .strict_flag()
                .unwrap_or(self.options.strict_trailing_slash),
            sensitive: route.sensitive_flag().unwrap_or(self.options.case_sensitive),
        };

        let found = match_path(&self.cache, pathname, resolved.as_slice(), options)?;
        let Some(mut matched) = found else {
            return Ok(None);
        };

        if let Some(parent) = parent {
            for (name, value) in &parent.params {
                matched
                    .params
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        Ok(Some(matched))
    }
}

/// Joins a relative child pattern onto its ancestor's pattern.
fn resolve_pattern<'a>(base: Option<&str>, pattern: &'a str) -> Cow<'a, str> {
    if pattern.starts_with('/') {
        return Cow::Borrowed(pattern);
    }
    let base = base.unwrap_or("/").trim_end_matches('/');
    Cow::Owned(format!("{base}/{pattern}"))
}
