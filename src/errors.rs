use crate::pattern::PatternError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("No route for {pathname}")]
    NoRoute { pathname: String },
    #[error("route tree nesting exceeds the configured depth of {limit} while matching '{pathname}'")]
    RouteDepthExceeded { limit: usize, pathname: String },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

pub type RouterResult<T> = Result<T, RouterError>;
