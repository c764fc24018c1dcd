mod ast;
mod cache;
mod compiled;
mod error;
mod parser;

pub use ast::{ParamKind, ParameterConstraint, ParameterNode, PatternAst, PatternNode, Quantifier};
pub use cache::{CacheStats, DEFAULT_PATTERN_CACHE_LIMIT, PatternCache};
pub use compiled::{
    CaptureList, CompiledPattern, MatchFlags, PathToRegex, PatternCaptures, PatternCompiler,
};
pub use error::{PatternError, PatternResult};
pub use parser::parse_pattern;
