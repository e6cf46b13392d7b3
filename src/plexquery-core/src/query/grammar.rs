/// The pieces of a query language the playlist compiler needs to know.
pub trait QueryGrammar {
    /// Field holding an item's on-disk file path.
    fn path_field(&self) -> &str;

    /// Renders `value` as a literal that parses back to exactly `value`.
    fn escape_literal(&self, value: &str) -> String;

    /// An expression that matches no item.
    fn match_nothing(&self) -> &str;

    /// An expression matching items whose `field` equals `value`.
    fn equals_clause(&self, field: &str, value: &str) -> String;

    /// Joins clauses so that an item matching any of them matches.
    fn any_of(&self, clauses: &[String]) -> String;
}

/// The local library query language parsed by [`super::QueryParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryGrammar;

pub(crate) const QUOTE: char = '"';
pub(crate) const ESCAPE: char = '\\';
pub(crate) const FIELD_SEPARATOR: char = ':';
pub(crate) const EXACT_MARKER: char = '=';
pub(crate) const OR_SEPARATOR: char = ',';
pub(crate) const MATCH_NOTHING: &str = "#none";

impl LibraryGrammar {
    fn needs_quoting(value: &str) -> bool {
        value.is_empty()
            || value.starts_with('#')
            || value.ends_with(['+', '-'])
            || value.chars().any(|c| {
                c.is_whitespace()
                    || matches!(c, QUOTE | ESCAPE | FIELD_SEPARATOR | EXACT_MARKER | OR_SEPARATOR)
            })
    }
}

impl QueryGrammar for LibraryGrammar {
    fn path_field(&self) -> &str {
        "path"
    }

    fn escape_literal(&self, value: &str) -> String {
        if !Self::needs_quoting(value) {
            return value.to_owned();
        }
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push(QUOTE);
        for c in value.chars() {
            if c == QUOTE || c == ESCAPE {
                quoted.push(ESCAPE);
            }
            quoted.push(c);
        }
        quoted.push(QUOTE);
        quoted
    }

    fn match_nothing(&self) -> &str {
        MATCH_NOTHING
    }

    fn equals_clause(&self, field: &str, value: &str) -> String {
        format!(
            "{field}{FIELD_SEPARATOR}{EXACT_MARKER}{}",
            self.escape_literal(value)
        )
    }

    fn any_of(&self, clauses: &[String]) -> String {
        clauses.join(&format!(" {OR_SEPARATOR} "))
    }
}
