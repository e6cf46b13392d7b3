use std::borrow::Cow;
use std::cmp::Ordering;

/// Fields searched by a bare term without a `field:` prefix.
pub const DEFAULT_FIELDS: &[&str] = &["title", "artist", "album"];

/// Items that can be evaluated by a [`Filter`].
pub trait Fields {
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// An evaluable filter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches every item.
    All,
    /// Matches no item.
    Nothing,
    /// Byte-for-byte equality.
    Equals { field: String, value: String },
    /// Case-insensitive substring match.
    Contains { field: String, needle: String },
    /// Case-insensitive substring match on any of [`DEFAULT_FIELDS`].
    Keyword(String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn matches<F: Fields + ?Sized>(&self, item: &F) -> bool {
        match self {
            Filter::All => true,
            Filter::Nothing => false,
            Filter::Equals { field, value } => item
                .field(field)
                .map(|actual| actual.as_ref() == value)
                .unwrap_or(false),
            Filter::Contains { field, needle } => item
                .field(field)
                .map(|actual| contains_ignore_case(&actual, needle))
                .unwrap_or(false),
            Filter::Keyword(needle) => DEFAULT_FIELDS.iter().any(|field| {
                item.field(field)
                    .map(|actual| contains_ignore_case(&actual, needle))
                    .unwrap_or(false)
            }),
            Filter::And(filters) => filters.iter().all(|f| f.matches(item)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(item)),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A `field+` / `field-` sort clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    fn compare<F: Fields + ?Sized>(&self, a: &F, b: &F) -> Ordering {
        let ordering = compare_values(a.field(&self.field), b.field(&self.field));
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

// Missing values sort first; numbers compare numerically.
fn compare_values(a: Option<Cow<'_, str>>, b: Option<Cow<'_, str>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.to_lowercase().cmp(&b.to_lowercase()),
        },
    }
}

/// A parsed query: a filter plus the sort clauses to apply afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub filter: Filter,
    pub sort: Vec<Sort>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            sort: Vec::new(),
        }
    }
}

impl Query {
    /// Returns the matching items, sorted by the query's sort clauses.
    ///
    /// Without sort clauses the input order is kept.
    pub fn apply<'a, T: Fields>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut matched: Vec<&T> = items.iter().filter(|i| self.filter.matches(*i)).collect();
        if !self.sort.is_empty() {
            matched.sort_by(|a, b| {
                self.sort
                    .iter()
                    .map(|s| s.compare(*a, *b))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Item(BTreeMap<&'static str, &'static str>);

    impl Fields for Item {
        fn field(&self, name: &str) -> Option<Cow<'_, str>> {
            self.0.get(name).map(|v| Cow::Borrowed(*v))
        }
    }

    fn item(pairs: &[(&'static str, &'static str)]) -> Item {
        Item(pairs.iter().copied().collect())
    }

    #[test]
    fn equality_is_exact() {
        let track = item(&[("path", "/music/A.flac")]);
        assert!(Filter::equals("path", "/music/A.flac").matches(&track));
        assert!(!Filter::equals("path", "/music/a.flac").matches(&track));
        assert!(!Filter::equals("path", "/music/A").matches(&track));
        assert!(!Filter::equals("missing", "").matches(&track));
    }

    #[test]
    fn contains_ignores_case() {
        let track = item(&[("artist", "Boards of Canada")]);
        assert!(Filter::contains("artist", "boards").matches(&track));
        assert!(!Filter::contains("album", "boards").matches(&track));
    }

    #[test]
    fn keyword_searches_default_fields() {
        let track = item(&[("title", "Roygbiv"), ("path", "/music/hidden.flac")]);
        assert!(Filter::Keyword("ROYG".into()).matches(&track));
        assert!(!Filter::Keyword("hidden".into()).matches(&track));
    }

    #[test]
    fn empty_groups() {
        let track = item(&[]);
        assert!(Filter::And(Vec::new()).matches(&track));
        assert!(!Filter::Or(Vec::new()).matches(&track));
        assert!(!Filter::Nothing.matches(&track));
        assert!(Filter::All.matches(&track));
    }

    #[test]
    fn apply_sorts_numerically_then_by_text() {
        let items = vec![
            item(&[("track", "10"), ("title", "b")]),
            item(&[("track", "9"), ("title", "a")]),
            item(&[("title", "c")]),
        ];
        let query = Query {
            filter: Filter::All,
            sort: vec![Sort {
                field: "track".into(),
                order: SortOrder::Descending,
            }],
        };
        let titles: Vec<_> = query
            .apply(&items)
            .into_iter()
            .map(|i| i.0["title"])
            .collect();
        assert_eq!(titles, vec!["b", "a", "c"]);
    }

    #[test]
    fn apply_without_sort_keeps_input_order() {
        let items = vec![item(&[("title", "z")]), item(&[("title", "a")])];
        let titles: Vec<_> = Query::default()
            .apply(&items)
            .into_iter()
            .map(|i| i.0["title"])
            .collect();
        assert_eq!(titles, vec!["z", "a"]);
    }
}
