//! Free-text clause sanitation.
//!
//! Condition fragments typed into a WHERE box are embedded into SQL literally,
//! so this module is the only defense for them: a case-insensitive keyword
//! blacklist, comment/semicolon token checks, and bracket/quote balance
//! checks.
//!
//! This is a heuristic against casual injection, not a full parser, and it is
//! documented as best-effort: stacked keywords disguised inside quoted
//! material can slip through. Anything stronger belongs to the database's own
//! privileges, not to string inspection.

use std::sync::OnceLock;

use crate::error::{QueryError, QueryResult};

/// Statement keywords that must never appear in a condition fragment.
const BLACKLISTED_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "INSERT", "UPDATE", "CREATE", "ALTER", "TRUNCATE", "EXEC", "EXECUTE",
];

/// Comment and statement-separator tokens, matched by substring.
const BLACKLISTED_TOKENS: &[&str] = &["--", "/*", "*/", ";"];

fn keyword_regex() -> &'static regex::Regex {
    static KEYWORD_RE: OnceLock<regex::Regex> = OnceLock::new();
    KEYWORD_RE.get_or_init(|| {
        let alternation = BLACKLISTED_KEYWORDS.join("|");
        regex::Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
            .expect("invalid built-in keyword regex")
    })
}

/// Check whether a free-text fragment is safe to embed in a WHERE/ORDER BY
/// position. Empty text is trivially accepted.
///
/// The returned error names the offending token or imbalance.
pub fn validate_clause(text: &str) -> QueryResult<()> {
    if text.is_empty() {
        return Ok(());
    }

    if let Some(m) = keyword_regex().find(text) {
        return Err(QueryError::unsafe_clause(format!(
            "forbidden keyword '{}'",
            m.as_str().to_uppercase()
        )));
    }

    for token in BLACKLISTED_TOKENS {
        if text.contains(token) {
            return Err(QueryError::unsafe_clause(format!(
                "forbidden token '{token}'"
            )));
        }
    }

    let open = text.chars().filter(|&c| c == '(').count();
    let close = text.chars().filter(|&c| c == ')').count();
    if open != close {
        return Err(QueryError::unsafe_clause(format!(
            "unbalanced parentheses ({open} open, {close} close)"
        )));
    }

    let quotes = text.chars().filter(|&c| c == '\'').count();
    if quotes % 2 != 0 {
        return Err(QueryError::unsafe_clause(
            "unterminated string literal (odd number of single quotes)",
        ));
    }

    Ok(())
}

/// Convenience predicate form of [`validate_clause`].
pub fn is_safe_clause(text: &str) -> bool {
    validate_clause(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_empty() {
        assert!(validate_clause("").is_ok());
    }

    #[test]
    fn accepts_plain_comparison() {
        assert!(validate_clause("price > 100").is_ok());
        assert!(validate_clause("genre = 'Роман' AND available").is_ok());
    }

    #[test]
    fn rejects_stacked_statement() {
        let err = validate_clause("1=1; DROP TABLE Books").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DROP") || msg.contains(';'), "got: {msg}");
    }

    #[test]
    fn rejects_keywords_case_insensitively() {
        assert!(validate_clause("delete from x").is_err());
        assert!(validate_clause("TrUnCaTe y").is_err());
    }

    #[test]
    fn keyword_match_respects_word_boundaries() {
        // "updated_at" contains "update" but is not the keyword.
        assert!(validate_clause("updated_at > '2024-01-01'").is_ok());
        assert!(validate_clause("created > issued").is_ok());
    }

    #[test]
    fn rejects_comment_tokens() {
        assert!(validate_clause("price > 1 -- comment").is_err());
        assert!(validate_clause("price > 1 /* hidden */").is_err());
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(validate_clause("(price > 1").is_err());
        assert!(validate_clause("price > 1)").is_err());
        assert!(validate_clause("(price > 1) AND (x = 2)").is_ok());
    }

    #[test]
    fn rejects_odd_quote_count() {
        assert!(validate_clause("name = 'x").is_err());
        assert!(validate_clause("name = 'x'").is_ok());
    }

    #[test]
    fn is_safe_clause_mirrors_validate() {
        assert!(is_safe_clause("amount >= 5"));
        assert!(!is_safe_clause("; TRUNCATE Readers"));
    }
}
