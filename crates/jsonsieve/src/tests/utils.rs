use crate::{
    MatchRecord, MatchStrategy, ParseError, Query, SieveOptions, SieveParser, Value,
    produce_chunks,
};

pub(crate) fn sieve(patterns: &[&str], options: SieveOptions) -> SieveParser {
    let queries = patterns
        .iter()
        .map(|p| Query::new(p).expect("test pattern must compile"))
        .collect();
    SieveParser::new(queries, options)
}

pub(crate) fn run_with(
    patterns: &[&str],
    input: &str,
    options: SieveOptions,
) -> Result<Vec<MatchRecord>, ParseError> {
    let mut parser = sieve(patterns, options);
    let mut records = parser.feed(input)?;
    records.extend(parser.finish()?);
    Ok(records)
}

pub(crate) fn run(patterns: &[&str], input: &str) -> Result<Vec<MatchRecord>, ParseError> {
    run_with(patterns, input, SieveOptions::default())
}

pub(crate) fn run_chunked_with(
    patterns: &[&str],
    input: &str,
    parts: usize,
    options: SieveOptions,
) -> Result<Vec<MatchRecord>, ParseError> {
    let mut parser = sieve(patterns, options);
    let mut records = Vec::new();
    for chunk in produce_chunks(input, parts) {
        records.extend(parser.feed(chunk)?);
    }
    records.extend(parser.finish()?);
    Ok(records)
}

/// Parses a whole document via the root pattern.
pub(crate) fn parse_document(input: &str) -> Value {
    let mut records = run(&["$"], input).expect("document must parse");
    assert_eq!(records.len(), 1, "root pattern must emit exactly once");
    records.remove(0).value
}

pub(crate) fn parse_error(input: &str) -> ParseError {
    match run(&["$"], input) {
        Ok(records) => panic!("expected an error for {input:?}, got {records:?}"),
        Err(err) => err,
    }
}

/// Converts a `serde_json` value (parsed with `preserve_order`) into ours.
pub(crate) fn from_serde(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            Value::Number(n.as_f64().expect("test numbers fit in f64"))
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(a) => Value::Array(a.iter().map(from_serde).collect()),
        serde_json::Value::Object(m) => Value::Object(
            m.iter().map(|(k, v)| (k.clone(), from_serde(v))).collect(),
        ),
    }
}

/// Every strategy, for tests that must hold under both.
pub(crate) fn strategies() -> [MatchStrategy; 2] {
    [MatchStrategy::Scan, MatchStrategy::Incremental]
}
