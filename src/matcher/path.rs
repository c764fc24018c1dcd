use serde::{Deserialize, Serialize};

use super::captures_to_params;
use crate::pattern::{MatchFlags, PatternCache, PatternResult};
use crate::types::Params;

/// Outcome of matching one pattern against a pathname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// The pattern used to match.
    pub path: String,
    /// The matched portion of the pathname.
    pub url: String,
    pub is_exact: bool,
    pub params: Params,
}

impl MatchResult {
    /// Match used by a pathless route that has no ancestor.
    pub fn root(pathname: &str) -> Self {
        Self {
            path: "/".to_string(),
            url: "/".to_string(),
            is_exact: pathname == "/",
            params: Params::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathOptions {
    pub exact: bool,
    pub strict: bool,
    pub sensitive: bool,
}

impl PathOptions {
    pub fn flags(&self) -> MatchFlags {
        MatchFlags::from_options(self.exact, self.strict, self.sensitive)
    }
}

/// Matches `pathname` against each pattern in turn; the first success wins.
pub fn match_path<S: AsRef<str>>(
    cache: &PatternCache,
    pathname: &str,
    paths: &[S],
    options: PathOptions,
) -> PatternResult<Option<MatchResult>> {
    let flags = options.flags();

    for path in paths {
        let path = path.as_ref();
        let compiled = cache.compile(path, flags)?;
        let Some(captures) = compiled.exec(pathname) else {
            continue;
        };

        let is_exact = pathname == captures.url;
        if options.exact && !is_exact {
            continue;
        }

        let url = if path == "/" && captures.url.is_empty() {
            "/"
        } else {
            captures.url
        };

        return Ok(Some(MatchResult {
            path: path.to_string(),
            url: url.to_string(),
            is_exact,
            params: captures_to_params(compiled.param_names(), &captures.values),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PathToRegex;
    use std::sync::Arc;

    fn cache() -> PatternCache {
        PatternCache::new(Arc::new(PathToRegex), 16)
    }

    #[test]
    fn root_pattern_reports_slash_url() {
        let matched = match_path(&cache(), "/users/1", &["/"], PathOptions::default())
            .unwrap()
            .expect("root should match");

        assert_eq!(matched.url, "/");
        assert!(!matched.is_exact);
    }

    #[test]
    fn first_matching_pattern_in_list_wins() {
        let matched = match_path(
            &cache(),
            "/team/7",
            &["/people/:id", "/team/:id", "/team/:slug"],
            PathOptions::default(),
        )
        .unwrap()
        .expect("second pattern should match");

        assert_eq!(matched.path, "/team/:id");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn exact_option_rejects_prefix_matches() {
        let options = PathOptions {
            exact: true,
            ..PathOptions::default()
        };
        let missed = match_path(&cache(), "/users/1/edit", &["/users/:id"], options).unwrap();
        assert!(missed.is_none());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let matched = MatchResult::root("/");
        let value = serde_json::to_value(&matched).unwrap();
        assert_eq!(value["isExact"], serde_json::Value::Bool(true));
        assert_eq!(value["url"], "/");
    }
}
