//! The streaming driver: queries in, matched records out.
//!
//! [`SieveParser`] wires the tokenizer, the value builder and the match
//! engine together. Each [`feed`](SieveParser::feed) call runs the pipeline
//! to the end of the available input and returns the records whose values
//! completed during it; [`finish`](SieveParser::finish) closes the stream
//! and checks termination.
use core::fmt;
use core::mem;

use crate::builder::{BuildEvent, PathStep, ValueBuilder};
use crate::engine::{MatchEngine, ValueOutcome};
use crate::error::{ErrorKind, ParseError, PatternError, ValidationIssue};
use crate::options::SieveOptions;
use crate::pattern::Pattern;
use crate::tokenizer::Tokenizer;
use crate::value::Value;

/// Per-match validation capability.
///
/// Validators run synchronously at emission time. They may transform the
/// value; the transformed value is what the emitted record carries. Any
/// returned issues surface as a [`ParseError`] with
/// [`ErrorKind::Validation`], which is fatal for the parse.
///
/// Implemented for closures:
///
/// ```
/// use jsonsieve::{ValidationIssue, Validator, Value};
///
/// let non_null = |v: Value| {
///     if v.is_null() {
///         Err(vec![ValidationIssue::new("null is not allowed")])
///     } else {
///         Ok(v)
///     }
/// };
/// assert!(non_null.validate(Value::Null).is_err());
/// ```
pub trait Validator {
    /// Validates (and possibly transforms) an emitted value.
    ///
    /// # Errors
    ///
    /// Returns the list of issues when the value is rejected.
    fn validate(&self, value: Value) -> Result<Value, Vec<ValidationIssue>>;
}

impl<F> Validator for F
where
    F: Fn(Value) -> Result<Value, Vec<ValidationIssue>>,
{
    fn validate(&self, value: Value) -> Result<Value, Vec<ValidationIssue>> {
        self(value)
    }
}

/// One registered query: a compiled pattern plus an optional validator.
pub struct Query {
    pattern: Pattern,
    validator: Option<Box<dyn Validator>>,
}

impl Query {
    /// Compiles `pattern` into a query without a validator.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for invalid pattern syntax.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self::from_pattern(Pattern::compile(pattern)?))
    }

    /// Wraps an already-compiled pattern.
    #[must_use]
    pub fn from_pattern(pattern: Pattern) -> Self {
        Self {
            pattern,
            validator: None,
        }
    }

    /// Attaches a validator invoked at every emission for this query.
    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// The compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("pattern", &self.pattern.text())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// A value emitted for an exactly-matched pattern.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// Index of the query that matched, in registration order.
    pub pattern_index: usize,
    /// The matched value. Independently owned: mutating it never affects
    /// other records or the live parse.
    pub value: Value,
    /// Object key names captured at wildcard positions, in path order.
    /// `None` when no object key was captured (array elements capture
    /// nothing).
    pub wildcard_keys: Option<Vec<String>>,
}

/// The streaming sieve parser.
///
/// Feeds chunks of JSON text through an incremental parser while evaluating
/// the registered queries, emitting matched subtrees as soon as they are
/// complete and discarding everything no query still needs.
///
/// # Examples
///
/// ```rust
/// use jsonsieve::{Query, SieveOptions, SieveParser, Value};
///
/// let queries = vec![Query::new("$.items[*]").unwrap()];
/// let mut parser = SieveParser::new(queries, SieveOptions::default());
///
/// let mut records = parser.feed(r#"{"items": [1, "#).unwrap();
/// records.extend(parser.feed(r#"2], "skipped": {}}"#).unwrap());
/// let records = {
///     let mut all = records;
///     all.extend(parser.finish().unwrap());
///     all
/// };
///
/// let values: Vec<Value> = records.into_iter().map(|r| r.value).collect();
/// assert_eq!(values, vec![Value::Number(1.0), Value::Number(2.0)]);
/// ```
pub struct SieveParser {
    tokenizer: Tokenizer,
    builder: ValueBuilder,
    engine: MatchEngine,
    queries: Vec<Query>,
    /// Scratch event buffer reused across tokens.
    events: Vec<BuildEvent>,
    poisoned: bool,
}

impl SieveParser {
    /// Creates a parser over `queries`. The query set is immutable for the
    /// lifetime of the parse.
    #[must_use]
    pub fn new(queries: Vec<Query>, options: SieveOptions) -> Self {
        let patterns = queries.iter().map(|q| q.pattern.clone()).collect();
        Self {
            tokenizer: Tokenizer::new(options.multi),
            builder: ValueBuilder::new(),
            engine: MatchEngine::new(patterns, options.strategy),
            queries,
            events: Vec::new(),
            poisoned: false,
        }
    }

    /// The registered queries, in registration order.
    #[must_use]
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// Feeds one chunk of input, returning the records completed by it.
    ///
    /// # Errors
    ///
    /// Any lexical, grammar or validation error is fatal: it poisons the
    /// parser and every subsequent call fails with [`ErrorKind::Poisoned`].
    pub fn feed(&mut self, chunk: &str) -> Result<Vec<MatchRecord>, ParseError> {
        self.guard()?;
        self.tokenizer.feed(chunk);
        let mut records = Vec::new();
        if let Err(err) = self.pump(&mut records) {
            self.poisoned = true;
            return Err(err);
        }
        Ok(records)
    }

    /// Closes the input, drains pending tokens (a trailing number included)
    /// and checks termination.
    ///
    /// # Errors
    ///
    /// Everything `feed` raises, plus the end-of-input errors: unterminated
    /// container and empty input.
    pub fn finish(mut self) -> Result<Vec<MatchRecord>, ParseError> {
        self.guard()?;
        self.tokenizer.close();
        let mut records = Vec::new();
        self.pump(&mut records)?;
        self.builder.check_end(self.tokenizer.location())?;
        Ok(records)
    }

    /// Serialized size of all values currently retained by the parse.
    ///
    /// Exposed for memory-bound tests; not a stable API.
    #[doc(hidden)]
    #[must_use]
    pub fn unstable_retained_bytes(&self) -> usize {
        self.builder.retained_bytes()
    }

    fn guard(&self) -> Result<(), ParseError> {
        if self.poisoned {
            return Err(ParseError::at(
                self.tokenizer.location(),
                ErrorKind::Poisoned,
            ));
        }
        Ok(())
    }

    /// Drives tokenizer → builder → engine until input runs out.
    fn pump(&mut self, records: &mut Vec<MatchRecord>) -> Result<(), ParseError> {
        while let Some(token) = self.tokenizer.next_token()? {
            let at = self.tokenizer.location();
            let mut events = mem::take(&mut self.events);
            let accepted = self.builder.accept(token, at, &mut events);
            let result = accepted.and_then(|()| {
                let mut res = Ok(());
                for event in events.drain(..) {
                    res = self.dispatch(event, records);
                    if res.is_err() {
                        break;
                    }
                }
                res
            });
            events.clear();
            self.events = events;
            result?;
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        event: BuildEvent,
        records: &mut Vec<MatchRecord>,
    ) -> Result<(), ParseError> {
        match event {
            BuildEvent::Pushed { mode } => self.engine.on_push(mode),
            BuildEvent::KeySet { key } => self.engine.on_key(&key),
            BuildEvent::Popped { depth } => self.engine.on_pop(depth),
            BuildEvent::ValueCompleted { value, path } => {
                let outcome = self.engine.on_value(&path);
                self.emit(outcome, value, &path, records)?;
            }
        }
        Ok(())
    }

    /// Emits records for exact matches and retains or drops the value.
    ///
    /// Each emitted record owns its value independently. The last emission of
    /// a value nothing else needs receives the original subtree; every other
    /// consumer gets a deep copy, so overlapping patterns never alias.
    fn emit(
        &mut self,
        outcome: ValueOutcome,
        mut value: Value,
        path: &[PathStep],
        records: &mut Vec<MatchRecord>,
    ) -> Result<(), ParseError> {
        let ValueOutcome { matched, keep } = outcome;
        for (n, &index) in matched.iter().enumerate() {
            let moves = !keep && n + 1 == matched.len();
            let emitted = if moves {
                mem::replace(&mut value, Value::Null)
            } else {
                value.clone()
            };
            let query = &self.queries[index];
            let emitted = match &query.validator {
                Some(validator) => validator.validate(emitted).map_err(|issues| {
                    ParseError::at(
                        self.tokenizer.location(),
                        ErrorKind::Validation {
                            pattern: query.pattern.text().to_string(),
                            issues,
                        },
                    )
                })?,
                None => emitted,
            };
            records.push(MatchRecord {
                pattern_index: index,
                value: emitted,
                wildcard_keys: wildcard_keys(&query.pattern, path),
            });
        }
        if keep {
            self.builder.retain(value);
        }
        Ok(())
    }
}

impl fmt::Debug for SieveParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveParser")
            .field("queries", &self.queries)
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}

/// Object key names observed at the pattern's wildcard positions.
fn wildcard_keys(pattern: &Pattern, path: &[PathStep]) -> Option<Vec<String>> {
    let indexes = pattern.wildcard_indexes();
    if indexes.is_empty() {
        return None;
    }
    let mut keys = Vec::new();
    for &i in indexes {
        if let Some(PathStep::Key(k)) = path.get(i) {
            keys.push(k.clone());
        }
    }
    if keys.is_empty() { None } else { Some(keys) }
}
