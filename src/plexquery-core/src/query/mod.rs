//! The local library query language.
//!
//! Terms are separated by whitespace and combined with AND; an unquoted `,`
//! starts an alternative. `field:value` matches a substring, `field:=value`
//! matches exactly, a bare word searches title, artist and album. `field+`
//! and `field-` sort the result. `#none` matches nothing.

mod filter;
mod grammar;
mod parser;

pub use filter::{Fields, Filter, Query, Sort, SortOrder, DEFAULT_FIELDS};
pub use grammar::{LibraryGrammar, QueryGrammar};
pub use parser::{BoxError, FilterKind, ParseError, QueryParser};
