use super::utils::{run_chunked_with, run_with, strategies};
use crate::{ErrorKind, MatchStrategy, SieveOptions, Value};

fn multi(strategy: MatchStrategy) -> SieveOptions {
    SieveOptions { multi: true, strategy }
}

#[test]
fn concatenated_documents_each_emit() {
    for strategy in strategies() {
        let records = run_with(&["$"], "[1][2][3]", multi(strategy)).unwrap();
        let values: Vec<&Value> = records.iter().map(|r| &r.value).collect();
        assert_eq!(
            values,
            [
                &Value::Array(vec![Value::Number(1.0)]),
                &Value::Array(vec![Value::Number(2.0)]),
                &Value::Array(vec![Value::Number(3.0)]),
            ]
        );
    }
}

#[test]
fn the_same_input_is_an_error_without_multi() {
    let err = run_with(&["$"], "[1][2][3]", SieveOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TrailingData('['));
}

#[test]
fn record_separators_and_whitespace_between_documents() {
    for strategy in strategies() {
        let input = "\u{1E}{\"a\": 1}\n\u{1E}[2]\n";
        let records = run_with(&["$"], input, multi(strategy)).unwrap();
        assert_eq!(records.len(), 2);
    }
}

#[test]
fn whitespace_delimited_top_level_numbers() {
    let records = run_with(&["$"], "1 2 3", multi(MatchStrategy::Incremental)).unwrap();
    let values: Vec<&Value> = records.iter().map(|r| &r.value).collect();
    assert_eq!(
        values,
        [&Value::Number(1.0), &Value::Number(2.0), &Value::Number(3.0)]
    );
}

#[test]
fn sub_patterns_match_in_every_document() {
    for strategy in strategies() {
        let records = run_with(
            &["$.a"],
            r#"{"a": 1}{"b": 0}{"a": 2}"#,
            multi(strategy),
        )
        .unwrap();
        let values: Vec<&Value> = records.iter().map(|r| &r.value).collect();
        assert_eq!(values, [&Value::Number(1.0), &Value::Number(2.0)]);
    }
}

#[test]
fn multi_mode_survives_chunking() {
    let input = "\u{1E}[1, 2]\u{1E}{\"a\": [3]}\u{1E}4";
    let whole = run_with(&["$"], input, multi(MatchStrategy::Incremental)).unwrap();
    assert_eq!(whole.len(), 3);
    for parts in 1..=input.len() {
        let chunked = run_chunked_with(&["$"], input, parts, multi(MatchStrategy::Incremental))
            .unwrap();
        assert_eq!(chunked, whole, "differs when split into {parts} parts");
    }
}

#[test]
fn record_separator_is_rejected_inside_a_document() {
    let err = run_with(&["$"], "[1,\u{1E} 2]", multi(MatchStrategy::Incremental)).unwrap_err();
    assert!(
        matches!(err.kind, ErrorKind::UnexpectedCharacter { .. }),
        "{err}"
    );
}
