//! JSON Pointer representation for locating values in documents and schemas.
//!
//! This module provides [`JsonPointer`], an RFC 6901 pointer used for both the
//! instance path of a violation (where in the validated document it happened)
//! and its schema path (which keyword in the schema raised it).

use std::fmt::{self, Display};

use serde::{Serialize, Serializer};
use serde_json::Value;

/// An RFC 6901 JSON Pointer.
///
/// Tokens are stored unescaped; `~0` and `~1` escaping is applied only when
/// the pointer is displayed or parsed.
///
/// # Example
///
/// ```rust
/// use coroner::JsonPointer;
///
/// let pointer = JsonPointer::root()
///     .push("users")
///     .push_index(0)
///     .push("a/b");
///
/// assert_eq!(pointer.to_string(), "/users/0/a~1b");
/// assert_eq!(JsonPointer::parse("/users/0/a~1b"), pointer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// Creates an empty pointer referencing the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a pointer string.
    ///
    /// The empty string is the root. A missing leading `/` is tolerated so
    /// that pointer fragments such as `foo/bar` parse the same as `/foo/bar`.
    pub fn parse(pointer: &str) -> Self {
        let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
        if pointer.is_empty() {
            return Self::root();
        }
        let body = pointer.strip_prefix('/').unwrap_or(pointer);
        Self {
            tokens: body.split('/').map(unescape_token).collect(),
        }
    }

    /// Creates a pointer from already unescaped tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new pointer with a token appended.
    pub fn push(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// Returns a new pointer with an array index appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(index.to_string())
    }

    /// Returns a new pointer with all tokens of `other` appended.
    pub fn join(&self, other: &JsonPointer) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.extend(other.tokens.iter().cloned());
        Self { tokens }
    }

    /// Returns true if this pointer references the whole document.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if this pointer has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the unescaped tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns the last token, or None for the root.
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Returns the parent pointer, or None for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.tokens.is_empty() {
            None
        } else {
            Some(self.truncate(self.tokens.len() - 1))
        }
    }

    /// Returns a pointer made of the first `len` tokens.
    pub fn truncate(&self, len: usize) -> Self {
        Self {
            tokens: self.tokens[..len.min(self.tokens.len())].to_vec(),
        }
    }

    /// Returns true if `prefix` is this pointer or one of its ancestors.
    pub fn starts_with(&self, prefix: &JsonPointer) -> bool {
        self.tokens.starts_with(&prefix.tokens)
    }

    /// Returns the tokens following `prefix`, or None if `prefix` is not an ancestor.
    pub fn strip_prefix(&self, prefix: &JsonPointer) -> Option<&[String]> {
        self.tokens.strip_prefix(prefix.tokens.as_slice())
    }

    /// Resolves this pointer against a document.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.tokens
            .iter()
            .try_fold(document, |value, token| match value {
                Value::Object(map) => map.get(token),
                Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape_token(token))?;
        }
        Ok(())
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for JsonPointer {
    fn from(pointer: &str) -> Self {
        Self::parse(pointer)
    }
}

/// Escapes a single reference token (`~` as `~0`, `/` as `~1`).
pub fn escape_token(token: &str) -> String {
    if !token.contains(['~', '/']) {
        return token.to_string();
    }
    token.replace('~', "~0").replace('/', "~1")
}

/// Reverses [`escape_token`].
pub fn unescape_token(token: &str) -> String {
    if !token.contains('~') {
        return token.to_string();
    }
    token.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_pointer_is_empty() {
        let pointer = JsonPointer::root();
        assert!(pointer.is_root());
        assert!(pointer.is_empty());
        assert_eq!(pointer.len(), 0);
        assert_eq!(pointer.to_string(), "");
    }

    #[test]
    fn test_nested_tokens() {
        let pointer = JsonPointer::root().push("user").push("email");
        assert_eq!(pointer.to_string(), "/user/email");
    }

    #[test]
    fn test_token_with_index() {
        let pointer = JsonPointer::root().push("users").push_index(3);
        assert_eq!(pointer.to_string(), "/users/3");
    }

    #[test]
    fn test_escaping_round_trip() {
        let pointer = JsonPointer::root().push("a/b").push("m~n");
        assert_eq!(pointer.to_string(), "/a~1b/m~0n");
        assert_eq!(JsonPointer::parse("/a~1b/m~0n"), pointer);
    }

    #[test]
    fn test_parse_tolerates_fragment_and_missing_slash() {
        assert_eq!(JsonPointer::parse("#/definitions/id"), JsonPointer::parse("/definitions/id"));
        assert_eq!(JsonPointer::parse("foo/bar"), JsonPointer::parse("/foo/bar"));
        assert!(JsonPointer::parse("#").is_root());
    }

    #[test]
    fn test_empty_token_is_preserved() {
        let pointer = JsonPointer::parse("/");
        assert_eq!(pointer.tokens(), &["".to_string()]);
        assert_eq!(pointer.to_string(), "/");
    }

    #[test]
    fn test_parent_and_truncate() {
        let pointer = JsonPointer::parse("/a/0/b");
        assert_eq!(pointer.parent().unwrap().to_string(), "/a/0");
        assert_eq!(pointer.truncate(1).to_string(), "/a");
        assert_eq!(pointer.truncate(10), pointer);
        assert!(JsonPointer::root().parent().is_none());
    }

    #[test]
    fn test_prefix_helpers() {
        let base = JsonPointer::parse("/properties/id");
        let full = JsonPointer::parse("/properties/id/pattern");

        assert!(full.starts_with(&base));
        assert!(!base.starts_with(&full));
        assert_eq!(full.strip_prefix(&base), Some(&["pattern".to_string()][..]));
        assert_eq!(JsonPointer::parse("/items").strip_prefix(&base), None);
    }

    #[test]
    fn test_resolve() {
        let document = json!({ "a": [{ "b": 1 }], "c/d": true });

        assert_eq!(JsonPointer::parse("/a/0/b").resolve(&document), Some(&json!(1)));
        assert_eq!(JsonPointer::parse("/c~1d").resolve(&document), Some(&json!(true)));
        assert_eq!(JsonPointer::root().resolve(&document), Some(&document));
        assert_eq!(JsonPointer::parse("/a/9").resolve(&document), None);
        assert_eq!(JsonPointer::parse("/a/x").resolve(&document), None);
    }

    #[test]
    fn test_join_and_last() {
        let pointer = JsonPointer::parse("/a").join(&JsonPointer::parse("/b/c"));
        assert_eq!(pointer.to_string(), "/a/b/c");
        assert_eq!(pointer.last(), Some("c"));
        assert_eq!(JsonPointer::root().last(), None);
    }
}
