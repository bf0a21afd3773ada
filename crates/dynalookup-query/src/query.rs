//! Statement construction for a single entity.

use crate::types::{Entity, LookupOptions, StatementQuery};
use tracing::trace;

/// Token replaced by the escaped entity value in the parameter template
pub const ENTITY_TOKEN: &str = "{{entity}}";

/// Escape an entity value for embedding in a quoted statement fragment.
///
/// Newlines are stripped, the first backslash is doubled, and every single
/// quote becomes a lone backslash. The quote rule does not yield a literal
/// quote; existing configurations depend on it.
pub fn escape_entity_value(value: &str) -> String {
    let escaped = value
        .replace(['\r', '\n'], "")
        .replacen('\\', "\\\\", 1)
        .replace('\'', "\\");

    trace!(entity_value = %value, escaped_value = %escaped, "Escaped entity value");
    escaped
}

/// Build the statement for one entity.
///
/// The statement template is passed through verbatim; the store binds the
/// single parameter positionally.
pub fn build_query(entity: &Entity, options: &LookupOptions) -> StatementQuery {
    let parameter = options
        .query_parameter
        .replace(ENTITY_TOKEN, &escape_entity_value(&entity.value));

    StatementQuery {
        statement: options.query.clone(),
        parameters: vec![parameter],
        limit: options.limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_strips_newlines_and_replaces_quotes() {
        assert_eq!(escape_entity_value("O'Brien\n"), "O\\Brien");
        assert_eq!(escape_entity_value("a\r\nb\rc\nd"), "abcd");
        assert_eq!(escape_entity_value("'quoted'"), "\\quoted\\");
    }

    #[test]
    fn test_escape_doubles_first_backslash_only() {
        assert_eq!(escape_entity_value("C:\\temp"), "C:\\\\temp");
        assert_eq!(escape_entity_value("a\\b\\c"), "a\\\\b\\c");
    }

    #[test]
    fn test_escape_leaves_other_characters() {
        assert_eq!(escape_entity_value("user@example.com"), "user@example.com");
        assert_eq!(escape_entity_value("\"double\" %_"), "\"double\" %_");
    }

    #[test]
    fn test_build_query_substitutes_parameter_only() {
        let options = LookupOptions::new(
            "us-east-1",
            "SELECT * FROM t WHERE id = {{entity}}",
            "{{entity}}",
        )
        .with_limit(25);

        let query = build_query(&Entity::new("abc"), &options);
        assert_eq!(query.statement, "SELECT * FROM t WHERE id = {{entity}}");
        assert_eq!(query.parameters, vec!["abc".to_string()]);
        assert_eq!(query.limit, Some(25));
    }

    #[test]
    fn test_build_query_escapes_value_inside_template() {
        let options = LookupOptions::new("us-east-1", "SELECT * FROM t WHERE id = ?", "USER#{{entity}}");
        let query = build_query(&Entity::new("O'Brien\n"), &options);
        assert_eq!(query.parameters, vec!["USER#O\\Brien".to_string()]);
        assert_eq!(query.limit, None);
    }

    #[test]
    fn test_build_query_without_token_sends_template_literally() {
        let options = LookupOptions::new("us-east-1", "SELECT * FROM t WHERE id = ?", "fixed");
        let query = build_query(&Entity::new("abc"), &options);
        assert_eq!(query.parameters, vec!["fixed".to_string()]);
    }
}
