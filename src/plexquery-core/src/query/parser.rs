use super::filter::{Filter, Query, Sort, SortOrder};
use super::grammar::{
    ESCAPE, EXACT_MARKER, FIELD_SEPARATOR, MATCH_NOTHING, OR_SEPARATOR, QUOTE,
};
use std::collections::BTreeMap;
use std::mem;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A query term kind contributed from outside the parser.
///
/// A kind registered under `prefix` receives the value of every
/// `prefix:value` term and returns the filter that replaces it.
pub trait FilterKind {
    fn build(&self, pattern: &str) -> Result<Filter, BoxError>;
}

impl<F> FilterKind for F
where
    F: Fn(&str) -> Result<Filter, BoxError>,
{
    fn build(&self, pattern: &str) -> Result<Filter, BoxError> {
        self(pattern)
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unterminated quote in query")]
    UnterminatedQuote,
    #[error("dangling escape at end of query")]
    DanglingEscape,
    #[error("{prefix} query failed: {source}")]
    FilterKind { prefix: String, source: BoxError },
}

/// Parses library queries, dispatching registered prefixes to their kinds.
#[derive(Default)]
pub struct QueryParser<'a> {
    kinds: BTreeMap<String, Box<dyn FilterKind + 'a>>,
}

impl<'a> QueryParser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind` for terms of the form `prefix:value`.
    ///
    /// A later registration under the same prefix replaces the earlier one.
    pub fn register(&mut self, prefix: impl Into<String>, kind: impl FilterKind + 'a) {
        let prefix = prefix.into();
        tracing::debug!(%prefix, "registered query prefix");
        self.kinds.insert(prefix, Box::new(kind));
    }

    pub fn is_registered(&self, prefix: &str) -> bool {
        self.kinds.contains_key(prefix)
    }

    /// Parses a query string; whitespace separates terms.
    pub fn parse(&self, input: &str) -> Result<Query, ParseError> {
        let tokens = tokenize(input, true)?;
        self.build_query(tokens)
    }

    /// Parses pre-split arguments; each argument is one term.
    pub fn parse_args<S: AsRef<str>>(&self, args: &[S]) -> Result<Query, ParseError> {
        let mut tokens = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            if arg.strip_prefix(OR_SEPARATOR) == Some("") {
                tokens.push(Token::Or);
            } else {
                tokens.extend(tokenize(arg, false)?);
            }
        }
        self.build_query(tokens)
    }

    fn build_query(&self, tokens: Vec<Token>) -> Result<Query, ParseError> {
        let mut groups = Vec::new();
        let mut current = Vec::new();
        let mut sort = Vec::new();
        for token in tokens {
            match token {
                Token::Or => groups.push(mem::take(&mut current)),
                Token::Word(word) => match word.as_sort() {
                    Some(clause) => sort.push(clause),
                    None => current.push(self.term(word)?),
                },
            }
        }
        groups.push(current);

        let filter = if groups.len() == 1 {
            conjunction(groups.remove(0))
        } else {
            Filter::Or(groups.into_iter().map(conjunction).collect())
        };
        Ok(Query { filter, sort })
    }

    fn term(&self, word: Word) -> Result<Filter, ParseError> {
        let Some(field) = word.field else {
            if !word.quoted && word.value == MATCH_NOTHING {
                return Ok(Filter::Nothing);
            }
            return Ok(Filter::Keyword(word.value));
        };
        if let Some(kind) = self.kinds.get(&field) {
            tracing::debug!(prefix = %field, pattern = %word.value, "expanding query term");
            return kind
                .build(&word.value)
                .map_err(|source| ParseError::FilterKind {
                    prefix: field,
                    source,
                });
        }
        if word.exact {
            Ok(Filter::Equals {
                field,
                value: word.value,
            })
        } else {
            Ok(Filter::Contains {
                field,
                needle: word.value,
            })
        }
    }
}

fn conjunction(mut filters: Vec<Filter>) -> Filter {
    match filters.len() {
        0 => Filter::All,
        1 => filters.remove(0),
        _ => Filter::And(filters),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Or,
    Word(Word),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Word {
    field: Option<String>,
    exact: bool,
    value: String,
    quoted: bool,
    started: bool,
}

impl Word {
    fn push(&mut self, c: char) {
        self.value.push(c);
        self.started = true;
    }

    fn finish_into(&mut self, tokens: &mut Vec<Token>) {
        if self.started {
            tokens.push(Token::Word(mem::take(self)));
        }
    }

    fn as_sort(&self) -> Option<Sort> {
        if self.field.is_some() || self.quoted {
            return None;
        }
        let order = match self.value.chars().last()? {
            '+' => SortOrder::Ascending,
            '-' => SortOrder::Descending,
            _ => return None,
        };
        let field = &self.value[..self.value.len() - 1];
        let mut chars = field.chars();
        let first = chars.next()?;
        let identifier = (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        identifier.then(|| Sort {
            field: field.to_owned(),
            order,
        })
    }
}

fn tokenize(input: &str, split_terms: bool) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut word = Word::default();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                ESCAPE => match chars.next() {
                    Some(escaped) => word.push(escaped),
                    None => return Err(ParseError::DanglingEscape),
                },
                QUOTE => in_quotes = false,
                _ => word.push(c),
            }
            continue;
        }
        match c {
            QUOTE => {
                in_quotes = true;
                word.quoted = true;
                word.started = true;
            }
            OR_SEPARATOR if split_terms => {
                word.finish_into(&mut tokens);
                tokens.push(Token::Or);
            }
            c if split_terms && c.is_whitespace() => word.finish_into(&mut tokens),
            FIELD_SEPARATOR if word.field.is_none() && !word.quoted => {
                word.field = Some(mem::take(&mut word.value));
                word.started = true;
                if chars.peek() == Some(&EXACT_MARKER) {
                    chars.next();
                    word.exact = true;
                }
            }
            _ => word.push(c),
        }
    }

    if in_quotes {
        return Err(ParseError::UnterminatedQuote);
    }
    word.finish_into(&mut tokens);
    Ok(tokens)
}
