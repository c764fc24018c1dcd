use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("parameter in pattern '{pattern}' at byte {index} is missing a name")]
    ParameterMissingName { pattern: String, index: usize },
    #[error(
        "parameter name '{name}' in pattern '{pattern}' must start with an alphabetic character or underscore (found '{found}')"
    )]
    ParameterInvalidStart {
        pattern: String,
        name: String,
        found: char,
    },
    #[error("pattern '{pattern}' has an unexpected ')' at byte {index}")]
    UnexpectedClosingParenthesis { pattern: String, index: usize },
    #[error("pattern '{pattern}' has an unterminated group starting at byte {start}")]
    UnterminatedGroup { pattern: String, start: usize },
    #[error("pattern '{pattern}' has an empty group starting at byte {start}")]
    EmptyGroup { pattern: String, start: usize },
    #[error("pattern '{pattern}' ends with a lone escape character at byte {index}")]
    LoneEscapeCharacter { pattern: String, index: usize },
    #[error(
        "wildcard at byte {index} in pattern '{pattern}' cannot take the '{modifier}' modifier"
    )]
    WildcardQuantifierUnsupported {
        pattern: String,
        index: usize,
        modifier: char,
    },
    #[error("constraint for parameter '{name}' in pattern '{pattern}' declares a named group")]
    NamedGroupInConstraint { pattern: String, name: String },
    #[error("constraint for parameter '{name}' in pattern '{pattern}' is invalid: {error}")]
    RegexConstraintInvalid {
        pattern: String,
        name: String,
        error: String,
    },
    #[error("pattern '{pattern}' compiled to an invalid expression: {error}")]
    RegexBuild { pattern: String, error: String },
}

pub type PatternResult<T> = Result<T, PatternError>;
