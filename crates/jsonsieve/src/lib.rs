//! A streaming JSON parser that evaluates path queries while it parses,
//! emitting matched subtrees as soon as they complete and discarding
//! everything no query still needs.
//!
//! Designed for large inputs where the caller wants a handful of sub-values
//! (one array's elements, a couple of fields) and cannot afford to
//! materialize the whole document: peak memory is bounded by the data the
//! outstanding queries can still match, not by document size.
//!
//! Input arrives in chunks of any size. The parser's state is consistent at
//! every chunk boundary, so splitting inside a string escape, a number or a
//! surrogate pair changes nothing.
//!
//! # Examples
//!
//! ```
//! use jsonsieve::{Query, SieveOptions, SieveParser, Value};
//!
//! let queries = vec![
//!     Query::new("$.users[*].name").unwrap(),
//! ];
//! let mut parser = SieveParser::new(queries, SieveOptions::default());
//!
//! let mut records = Vec::new();
//! for chunk in [
//!     r#"{"users": [{"name": "ada", "bio": "..."},"#,
//!     r#" {"name": "grace", "bio": "..."}], "total": 2}"#,
//! ] {
//!     records.extend(parser.feed(chunk).unwrap());
//! }
//! records.extend(parser.finish().unwrap());
//!
//! let names: Vec<Value> = records.into_iter().map(|r| r.value).collect();
//! assert_eq!(names, vec![Value::from("ada"), Value::from("grace")]);
//! ```

mod buffer;
mod builder;
mod chunk_utils;
mod engine;
mod error;
mod escape_buffer;
mod literal_buffer;
mod options;
mod pattern;
mod sieve;
mod tokenizer;
mod value;

#[cfg(test)]
mod tests;

pub use chunk_utils::produce_chunks;
pub use engine::MatchStrategy;
pub use error::{ErrorKind, ParseError, PatternError, ValidationIssue};
pub use options::SieveOptions;
pub use pattern::{Component, Pattern};
pub use sieve::{MatchRecord, Query, SieveParser, Validator};
pub use value::{Array, Map, Value};
