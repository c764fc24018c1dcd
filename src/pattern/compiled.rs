use regex::{Regex, RegexBuilder};
use smallvec::SmallVec;

use super::ast::{PatternAst, PatternNode};
use super::parser::parse_pattern;
use super::{PatternError, PatternResult};

bitflags::bitflags! {
    /// Matching options folded into the outer cache key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MatchFlags: u8 {
        /// Anchor the pattern at the end of the pathname.
        const END = 1;
        /// Treat a trailing delimiter as significant.
        const STRICT = 1 << 1;
        /// Compare case-sensitively.
        const SENSITIVE = 1 << 2;
    }
}

impl MatchFlags {
    pub fn from_options(end: bool, strict: bool, sensitive: bool) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::END, end);
        flags.set(Self::STRICT, strict);
        flags.set(Self::SENSITIVE, sensitive);
        flags
    }
}

pub type CaptureList<'p> = SmallVec<[Option<&'p str>; 4]>;

/// Capture groups produced by one successful [`CompiledPattern::exec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternCaptures<'p> {
    pub url: &'p str,
    pub values: CaptureList<'p>,
}

/// A reusable matcher.
///
/// Group 1 of `matcher` spans the matched url and groups 2.. are the
/// parameters, positionally paired with `param_names`.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    matcher: Regex,
    param_names: Vec<String>,
}

impl CompiledPattern {
    pub fn new(matcher: Regex, param_names: Vec<String>) -> Self {
        Self {
            matcher,
            param_names,
        }
    }

    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn exec<'p>(&self, pathname: &'p str) -> Option<PatternCaptures<'p>> {
        let caps = self.matcher.captures(pathname)?;
        let url = caps.get(1).map_or("", |m| m.as_str());
        let values = (0..self.param_names.len())
            .map(|idx| caps.get(idx + 2).map(|m| m.as_str()))
            .collect();

        Some(PatternCaptures { url, values })
    }
}

/// Turns a path pattern into a [`CompiledPattern`].
pub trait PatternCompiler: Send + Sync {
    fn compile(&self, pattern: &str, flags: MatchFlags) -> PatternResult<CompiledPattern>;
}

/// Compiles `:name`, `:name?`, `:name*`, `:name+`, `:name(re)`, `(re)` and `*`
/// patterns into anchored regular expressions.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathToRegex;

impl PatternCompiler for PathToRegex {
    #[tracing::instrument(level = "trace", skip(self, pattern), fields(pattern = %pattern, flags = flags.bits()))]
    fn compile(&self, pattern: &str, flags: MatchFlags) -> PatternResult<CompiledPattern> {
        let ast = parse_pattern(pattern)?;
        let source = regex_source(&ast, flags);

        let matcher = RegexBuilder::new(&source)
            .case_insensitive(!flags.contains(MatchFlags::SENSITIVE))
            .build()
            .map_err(|err| PatternError::RegexBuild {
                pattern: pattern.to_string(),
                error: err.to_string(),
            })?;

        Ok(CompiledPattern::new(matcher, ast.param_names()))
    }
}

fn regex_source(ast: &PatternAst, flags: MatchFlags) -> String {
    let strict = flags.contains(MatchFlags::STRICT);
    let end = flags.contains(MatchFlags::END);

    let mut route = String::new();
    for node in &ast.nodes {
        match node {
            PatternNode::Literal(text) => route.push_str(&regex::escape(text)),
            PatternNode::Parameter(param) => {
                let prefix = param
                    .prefix
                    .map(|ch| regex::escape(ch.encode_utf8(&mut [0; 4])))
                    .unwrap_or_default();

                let single = format!("(?:{})", param.source());
                let body = if param.quantifier.is_repeating() {
                    format!("{single}(?:{prefix}{single})*")
                } else {
                    single
                };

                let capture = if !param.quantifier.is_optional() {
                    format!("{prefix}({body})")
                } else if param.partial {
                    format!("{prefix}({body})?")
                } else {
                    format!("(?:{prefix}({body}))?")
                };
                route.push_str(&capture);
            }
        }
    }

    let ends_with_delimiter = route.ends_with('/');
    if !strict && ends_with_delimiter {
        route.pop();
    }

    match (end, strict) {
        (true, false) => format!("^({route}/?)$"),
        (true, true) => format!("^({route})$"),
        (false, false) => format!("^({route}(?:/$)?)(?:/|$)"),
        (false, true) if ends_with_delimiter => format!("^({route})"),
        (false, true) => format!("^({route})(?:/|$)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str, flags: MatchFlags) -> CompiledPattern {
        PathToRegex
            .compile(pattern, flags)
            .expect("pattern should compile")
    }

    #[test]
    fn prefix_match_stops_at_segment_boundary() {
        let compiled = compile("/users/:id", MatchFlags::empty());
        let caps = compiled.exec("/users/42/posts").expect("prefix should match");
        assert_eq!(caps.url, "/users/42");
        assert_eq!(caps.values.as_slice(), &[Some("42")]);
        assert!(compiled.exec("/usersx/42").is_none());
    }

    #[test]
    fn end_flag_requires_full_match() {
        let compiled = compile("/users/:id", MatchFlags::END);
        assert!(compiled.exec("/users/42/posts").is_none());
        let caps = compiled.exec("/users/42/").expect("trailing slash is lenient");
        assert_eq!(caps.url, "/users/42/");
    }

    #[test]
    fn strict_flag_keeps_trailing_slash_significant() {
        let compiled = compile("/users/", MatchFlags::END | MatchFlags::STRICT);
        assert!(compiled.exec("/users").is_none());
        assert!(compiled.exec("/users/").is_some());
    }

    #[test]
    fn sensitive_flag_controls_case() {
        assert!(compile("/About", MatchFlags::empty()).exec("/about").is_some());
        assert!(compile("/About", MatchFlags::SENSITIVE).exec("/about").is_none());
    }

    #[test]
    fn optional_parameter_is_absent_when_missing() {
        let compiled = compile("/files/:name?", MatchFlags::END);
        let caps = compiled.exec("/files").expect("optional segment may be missing");
        assert_eq!(caps.values.as_slice(), &[None]);
    }

    #[test]
    fn repeating_parameter_joins_segments() {
        let compiled = compile("/docs/:path+", MatchFlags::END);
        let caps = compiled.exec("/docs/a/b/c").expect("repeat should match");
        assert_eq!(caps.values.as_slice(), &[Some("a/b/c")]);
        assert!(compiled.exec("/docs").is_none());
    }

    #[test]
    fn constrained_parameter_rejects_other_values() {
        let compiled = compile("/orders/:id(\\d+)", MatchFlags::END);
        assert!(compiled.exec("/orders/abc").is_none());
        assert_eq!(
            compiled.exec("/orders/7").map(|caps| caps.values[0]),
            Some(Some("7"))
        );
    }

    #[test]
    fn root_pattern_matches_empty_prefix() {
        let compiled = compile("/", MatchFlags::empty());
        let caps = compiled.exec("/anything").expect("root should prefix-match");
        assert_eq!(caps.url, "");
    }
}
