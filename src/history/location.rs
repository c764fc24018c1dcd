use memchr::{memchr, memchr2};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
}

impl Location {
    /// Splits `path?search#hash`; a missing pathname becomes `/`.
    pub fn parse(input: &str) -> Self {
        let path_end = memchr2(b'?', b'#', input.as_bytes()).unwrap_or(input.len());
        let (path, rest) = input.split_at(path_end);

        let (search, hash) = if rest.starts_with('?') {
            match memchr(b'#', rest.as_bytes()) {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            }
        } else {
            ("", rest)
        };

        let pathname = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            pathname,
            search: non_trivial(search, '?'),
            hash: non_trivial(hash, '#'),
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

fn non_trivial(part: &str, marker: char) -> String {
    if part.len() == marker.len_utf8() {
        String::new()
    } else {
        part.to_string()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::parse("/")
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pathname, self.search, self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_pathname_search_and_hash() {
        let location = Location::parse("/users/42?tab=posts#top");
        assert_eq!(location.pathname, "/users/42");
        assert_eq!(location.search, "?tab=posts");
        assert_eq!(location.hash, "#top");
        assert_eq!(location.href(), "/users/42?tab=posts#top");
    }

    #[test]
    fn hash_may_contain_question_mark() {
        let location = Location::parse("/faq#why?");
        assert_eq!(location.pathname, "/faq");
        assert_eq!(location.search, "");
        assert_eq!(location.hash, "#why?");
    }

    #[test]
    fn normalizes_missing_and_relative_pathnames() {
        assert_eq!(Location::parse("?q=1").pathname, "/");
        assert_eq!(Location::parse("about").pathname, "/about");
        assert_eq!(Location::parse("/a?#").search, "");
        assert_eq!(Location::parse("/a?#").hash, "");
    }
}
