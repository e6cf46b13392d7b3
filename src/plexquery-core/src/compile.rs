use crate::query::{Fields, Filter, QueryGrammar};
use std::collections::BTreeSet;
use std::fmt;

/// "path equals any of these", ready to hand to the library query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeFilter {
    filter: Filter,
    expression: String,
    path_count: usize,
}

impl CompositeFilter {
    pub fn matches<F: Fields + ?Sized>(&self, item: &F) -> bool {
        self.filter.matches(item)
    }

    /// The filter rendered in the grammar it was compiled for.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn matches_nothing(&self) -> bool {
        self.path_count == 0
    }

    pub fn into_filter(self) -> Filter {
        self.filter
    }
}

impl fmt::Display for CompositeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Compiles local paths into one OR of path equality clauses.
///
/// Duplicates collapse and input order does not matter. No paths compiles to
/// a filter that matches nothing.
pub fn compile<I, S, G>(local_paths: I, grammar: &G) -> CompositeFilter
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    G: QueryGrammar + ?Sized,
{
    let paths: BTreeSet<String> = local_paths.into_iter().map(Into::into).collect();
    if paths.is_empty() {
        return CompositeFilter {
            filter: Filter::Nothing,
            expression: grammar.match_nothing().to_owned(),
            path_count: 0,
        };
    }

    let field = grammar.path_field();
    let clauses: Vec<String> = paths
        .iter()
        .map(|path| grammar.equals_clause(field, path))
        .collect();
    let path_count = paths.len();
    let filter = Filter::Or(
        paths
            .into_iter()
            .map(|path| Filter::equals(field, path))
            .collect(),
    );
    CompositeFilter {
        filter,
        expression: grammar.any_of(&clauses),
        path_count,
    }
}
