//! Safe SQL identifier handling.
//!
//! This module provides [`is_valid_identifier`] and [`Ident`], the first line
//! of defense for table/column/type names that get interpolated into SQL text.
//!
//! Accepted names match `[A-Za-z_][A-Za-z0-9_]*` and are at most 63 bytes
//! (the PostgreSQL identifier limit). This is deliberately stricter than what
//! PostgreSQL itself allows (no `$`, no dots, no quoted forms): the names here
//! come from GUI selections over a small fixed schema, and the narrow rule
//! guarantees a quoted identifier never needs escaping.
//!
//! Syntactic validity is only stage one; callers additionally confirm the name
//! exists in a [`SchemaRegistry`](crate::schema::SchemaRegistry) before use.

use crate::error::{QueryError, QueryResult};

/// Maximum identifier length in bytes, matching the PostgreSQL limit.
pub const MAX_IDENT_LEN: usize = 63;

/// Check whether a string is safe to interpolate as a SQL identifier.
///
/// Rules: non-empty, at most 63 bytes, first character an ASCII letter or
/// underscore, remaining characters ASCII alphanumeric or underscore.
pub fn is_valid_identifier(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_IDENT_LEN {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// A validated SQL identifier (table, column, or type name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(String);

impl Ident {
    /// Validate a name and wrap it.
    pub fn new(name: &str) -> QueryResult<Self> {
        if name.is_empty() {
            return Err(QueryError::identifier("identifier cannot be empty"));
        }
        if name.len() > MAX_IDENT_LEN {
            return Err(QueryError::identifier(format!(
                "identifier exceeds {MAX_IDENT_LEN} bytes: '{name}'"
            )));
        }
        if !is_valid_identifier(name) {
            return Err(QueryError::identifier(format!(
                "invalid characters in identifier: '{name}'"
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// The raw (unquoted) name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the identifier as quoted SQL.
    ///
    /// The character rule guarantees the name contains no `"`, so no escaping
    /// is required.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push('"');
        out.push_str(&self.0);
        out.push('"');
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::new("book_title").unwrap();
        assert_eq!(ident.to_sql(), "\"book_title\"");
    }

    #[test]
    fn ident_leading_underscore() {
        assert!(is_valid_identifier("_internal"));
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(!is_valid_identifier(""));
        assert!(Ident::new("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(!is_valid_identifier("1table"));
    }

    #[test]
    fn ident_rejects_space() {
        assert!(!is_valid_identifier("my table"));
    }

    #[test]
    fn ident_rejects_semicolon_payload() {
        assert!(!is_valid_identifier("a; DROP TABLE x"));
    }

    #[test]
    fn ident_rejects_dollar() {
        // Allowed by PostgreSQL unquoted rules, rejected here.
        assert!(!is_valid_identifier("my_var$1"));
    }

    #[test]
    fn ident_rejects_dotted() {
        assert!(!is_valid_identifier("public.users"));
    }

    #[test]
    fn ident_rejects_over_63_bytes() {
        let long = "a".repeat(64);
        assert!(!is_valid_identifier(&long));
        assert!(is_valid_identifier(&"a".repeat(63)));
    }

    #[test]
    fn quoted_form_never_needs_escaping() {
        for name in ["readers", "issue_date", "_x9", "Books"] {
            let sql = Ident::new(name).unwrap().to_sql();
            assert_eq!(sql.matches('"').count(), 2);
        }
    }
}
