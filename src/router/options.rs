use crate::pattern::DEFAULT_PATTERN_CACHE_LIMIT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_ROUTE_DEPTH: usize = 32;

/// Router-wide matching settings.
///
/// Route trees may nest to any depth up to `max_route_depth`; matching a
/// deeper branch fails with `RouteDepthExceeded` instead of recursing further.
/// Raise the limit for deeper trees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouterOptions {
    /// Distinct `(pattern, flags)` keys retained by the pattern cache.
    pub pattern_cache_limit: usize,
    /// Applied to routes that leave `sensitive` unset.
    pub case_sensitive: bool,
    /// Applied to routes that leave `strict` unset.
    pub strict_trailing_slash: bool,
    /// Deepest nesting level the matcher descends into, counting the
    /// top-level routes as 1.
    pub max_route_depth: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            pattern_cache_limit: DEFAULT_PATTERN_CACHE_LIMIT,
            case_sensitive: false,
            strict_trailing_slash: false,
            max_route_depth: DEFAULT_MAX_ROUTE_DEPTH,
        }
    }
}

impl RouterOptions {
    pub fn builder() -> RouterOptionsBuilder {
        RouterOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), RouterOptionsError> {
        if self.max_route_depth == 0 {
            return Err(RouterOptionsError::MaxRouteDepthInvalid { provided: 0 });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RouterOptionsBuilder {
    options: RouterOptions,
}

impl RouterOptionsBuilder {
    pub fn pattern_cache_limit(mut self, value: usize) -> Self {
        self.options.pattern_cache_limit = value;
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.options.case_sensitive = value;
        self
    }

    pub fn strict_trailing_slash(mut self, value: bool) -> Self {
        self.options.strict_trailing_slash = value;
        self
    }

    pub fn max_route_depth(mut self, value: usize) -> Self {
        self.options.max_route_depth = value;
        self
    }

    pub fn build(self) -> Result<RouterOptions, RouterOptionsError> {
        let options = self.options;
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterOptionsError {
    #[error("max_route_depth must be at least 1 (got {provided})")]
    MaxRouteDepthInvalid { provided: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_when_depth_zero_then_rejects() {
        let err = RouterOptions::builder()
            .max_route_depth(0)
            .build()
            .expect_err("zero depth should be rejected");
        assert_eq!(err, RouterOptionsError::MaxRouteDepthInvalid { provided: 0 });
    }

    #[test]
    fn builder_when_values_set_then_propagate() {
        let options = RouterOptions::builder()
            .pattern_cache_limit(3)
            .case_sensitive(true)
            .strict_trailing_slash(true)
            .build()
            .expect("options should build");

        assert_eq!(options.pattern_cache_limit, 3);
        assert!(options.case_sensitive);
        assert!(options.strict_trailing_slash);
        assert_eq!(options.max_route_depth, DEFAULT_MAX_ROUTE_DEPTH);
    }
}
