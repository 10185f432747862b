use super::utils::sieve;
use crate::{
    ErrorKind, Query, SieveOptions, SieveParser, ValidationIssue, Value,
};

fn doubling(v: Value) -> Result<Value, Vec<ValidationIssue>> {
    match v {
        Value::Number(n) => Ok(Value::Number(n * 2.0)),
        other => Err(vec![ValidationIssue::new(format!(
            "expected a number, got {other}"
        ))]),
    }
}

#[test]
fn validators_may_transform_emitted_values() {
    let queries = vec![Query::new("$[*]").unwrap().with_validator(doubling)];
    let mut parser = SieveParser::new(queries, SieveOptions::default());
    let mut records = parser.feed("[1, 2, 3]").unwrap();
    records.extend(parser.finish().unwrap());
    let values: Vec<&Value> = records.iter().map(|r| &r.value).collect();
    assert_eq!(
        values,
        [&Value::Number(2.0), &Value::Number(4.0), &Value::Number(6.0)]
    );
}

#[test]
fn validation_failure_is_fatal_at_emission_time() {
    let queries = vec![Query::new("$[*]").unwrap().with_validator(doubling)];
    let mut parser = SieveParser::new(queries, SieveOptions::default());
    let err = parser.feed(r#"[1, "not a number", 3]"#).unwrap_err();
    let ErrorKind::Validation { pattern, issues } = err.kind else {
        panic!("expected a validation error, got {err}");
    };
    assert_eq!(pattern, "$[*]");
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("expected a number"));

    // The failure poisons the parse like any other fatal error.
    let err = parser.feed("]").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Poisoned);
}

#[test]
fn validator_on_the_root_pattern() {
    let queries = vec![
        Query::new("$").unwrap().with_validator(
            |v: Value| -> Result<Value, Vec<ValidationIssue>> {
                Ok(Value::String(v.to_string()))
            },
        ),
    ];
    let mut parser = SieveParser::new(queries, SieveOptions::default());
    let mut records = parser.feed(r#"{"a": [1]}"#).unwrap();
    records.extend(parser.finish().unwrap());
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].value,
        Value::String(r#"{"a":[1]}"#.into())
    );
}

#[test]
fn queries_without_validators_are_untouched() {
    let queries = vec![
        Query::new("$.a").unwrap().with_validator(doubling),
        Query::new("$.b").unwrap(),
    ];
    let mut parser = SieveParser::new(queries, SieveOptions::default());
    let mut records = parser.feed(r#"{"a": 10, "b": 10}"#).unwrap();
    records.extend(parser.finish().unwrap());
    assert_eq!(records[0].value, Value::Number(20.0));
    assert_eq!(records[1].value, Value::Number(10.0));
    assert!(sieve(&["$.a"], SieveOptions::default()).queries()[0]
        .pattern()
        .text()
        .eq("$.a"));
}
