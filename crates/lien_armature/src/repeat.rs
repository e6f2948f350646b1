//! Repeat clause parser: `[key,] value in collection`.

use lien_carton::{is_identifier, CompactString};
use lien_relief::ast::RepeatClause;
use lien_relief::errors::ExpressionError;
use once_cell::sync::Lazy;
use regex::Regex;

/// The `in` keyword, case-insensitive, as a whole word.
static IN_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*\bin\b\s*").unwrap());

/// Parse a repeat clause.
///
/// The variables may be wrapped in parentheses (`(key, value) in items`).
/// Only the first `in` separates variables from the collection, so the
/// collection expression may itself contain the word.
pub fn parse_repeat(source: &str) -> Result<RepeatClause, ExpressionError> {
    let invalid = || ExpressionError::InvalidRepeat(CompactString::new(source.trim()));

    let found = IN_KEYWORD.find(source).ok_or_else(invalid)?;
    let locals = source[..found.start()].trim();
    let collection = source[found.end()..].trim();
    if collection.is_empty() {
        return Err(invalid());
    }

    let locals = locals
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(locals);
    let names: Vec<&str> = locals.split(',').map(str::trim).collect();
    if names.iter().any(|name| !is_identifier(name)) {
        return Err(invalid());
    }

    let (key_name, value_name) = match names.as_slice() {
        [value] => (None, *value),
        [key, value] => (Some(CompactString::new(key)), *value),
        _ => return Err(invalid()),
    };

    Ok(RepeatClause {
        key_name,
        value_name: CompactString::new(value_name),
        collection: CompactString::new(collection),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_only() {
        let clause = parse_repeat("item in items").unwrap();
        assert_eq!(clause.key_name, None);
        assert_eq!(clause.value_name, "item");
        assert_eq!(clause.collection, "items");
    }

    #[test]
    fn test_key_and_value() {
        let clause = parse_repeat("key, value IN config.entries | orderBy:'name'").unwrap();
        assert_eq!(clause.key_name.as_deref(), Some("key"));
        assert_eq!(clause.value_name, "value");
        assert_eq!(clause.collection, "config.entries | orderBy:'name'");
    }

    #[test]
    fn test_parenthesized_variables() {
        let clause = parse_repeat("(i, row) in rows").unwrap();
        assert_eq!(clause.key_name.as_deref(), Some("i"));
        assert_eq!(clause.value_name, "row");
    }

    #[test]
    fn test_word_boundary() {
        // `index` and `inbox` must not be taken for the keyword
        let clause = parse_repeat("index in inbox").unwrap();
        assert_eq!(clause.value_name, "index");
        assert_eq!(clause.collection, "inbox");
    }

    #[test]
    fn test_invalid_clauses() {
        assert!(parse_repeat("items").is_err());
        assert!(parse_repeat("item in").is_err());
        assert!(parse_repeat("a, b, c in items").is_err());
        assert!(parse_repeat("a.b in items").is_err());
        assert!(parse_repeat(" in items").is_err());
    }
}
