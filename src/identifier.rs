//! Identifier detection under the cursor
//!
//! Best-effort heuristic used by the context menu: given the text of a code
//! line and an estimated character column, find the whitespace-delimited
//! token covering that column and strip it down to an identifier. Column
//! estimation from a pointer position is inherently approximate, so this
//! stays a token-level heuristic rather than a precise text-offset
//! computation.

use std::sync::OnceLock;

use regex::Regex;

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

/// Whether a candidate string is identifier-shaped.
pub fn is_identifier(candidate: &str) -> bool {
    identifier_regex().is_match(candidate)
}

/// Extract the word-character token at (or spanning) the given character
/// column. Tokens are split on whitespace; the covering token is stripped
/// of non-word characters. Returns `None` when the column lands outside any
/// token or nothing word-like remains after stripping. The result is not
/// necessarily identifier-shaped (it may start with a digit).
pub fn token_at_column(line: &str, column: usize) -> Option<String> {
    let mut current = 0usize;
    for word in line.split_whitespace() {
        let len = word.chars().count();
        if current <= column && column <= current + len {
            let clean: String = word.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
            if clean.is_empty() {
                return None;
            }
            return Some(clean);
        }
        current += len + 1;
    }
    None
}

/// Like [`token_at_column`], but only returns identifier-shaped tokens.
pub fn identifier_at_column(line: &str, column: usize) -> Option<String> {
    token_at_column(line, column).filter(|token| is_identifier(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("main"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("parse_line2"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("foo-bar"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a b"));
    }

    #[test]
    fn test_identifier_under_column() {
        let line = "    result = compute_total(items);";
        // Column inside "compute_total(items);" resolves to the call name
        // with punctuation stripped.
        assert_eq!(identifier_at_column(line, 14).as_deref(), Some("compute_totalitems"));
    }

    #[test]
    fn test_identifier_simple_token() {
        let line = "static int counter;";
        assert_eq!(identifier_at_column(line, 12).as_deref(), Some("counter"));
        assert_eq!(identifier_at_column(line, 0).as_deref(), Some("static"));
    }

    #[test]
    fn test_column_past_end_yields_none() {
        assert_eq!(identifier_at_column("short", 99), None);
        assert_eq!(identifier_at_column("", 0), None);
    }

    #[test]
    fn test_non_identifier_token_yields_none() {
        // Pure punctuation strips to nothing.
        assert_eq!(identifier_at_column("a == b", 2), None);
    }

    #[test]
    fn test_token_at_column_keeps_non_identifiers() {
        // Digit-leading tokens are still tokens, just not identifiers.
        assert_eq!(token_at_column("x = 0x1f;", 4).as_deref(), Some("0x1f"));
        assert_eq!(identifier_at_column("x = 0x1f;", 4), None);
        assert_eq!(token_at_column("a == b", 2), None);
    }
}
