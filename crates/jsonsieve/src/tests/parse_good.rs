use rstest::rstest;

use super::utils::{from_serde, parse_document, run, run_chunked_with};
use crate::{Map, SieveOptions, Value};

fn obj(entries: &[(&str, Value)]) -> Value {
    let mut map = Map::new();
    for (k, v) in entries {
        map.insert((*k).to_string(), v.clone());
    }
    Value::Object(map)
}

#[test]
fn scalar_documents() {
    assert_eq!(parse_document("null"), Value::Null);
    assert_eq!(parse_document("true"), Value::Boolean(true));
    assert_eq!(parse_document("false"), Value::Boolean(false));
    assert_eq!(parse_document("\"hi\""), Value::String("hi".into()));
    assert_eq!(parse_document("42"), Value::Number(42.0));
    assert_eq!(parse_document("0"), Value::Number(0.0));
    assert_eq!(parse_document(" -0.5e2 "), Value::Number(-50.0));
}

#[test]
fn nested_structures() {
    assert_eq!(
        parse_document(r#"{"a": [1, {"b": null}], "c": {}}"#),
        obj(&[
            (
                "a",
                Value::Array(vec![
                    Value::Number(1.0),
                    obj(&[("b", Value::Null)]),
                ]),
            ),
            ("c", obj(&[])),
        ])
    );
    assert_eq!(
        parse_document("[[], [[]]]"),
        Value::Array(vec![
            Value::Array(vec![]),
            Value::Array(vec![Value::Array(vec![])]),
        ])
    );
}

#[test]
fn string_escapes_decode() {
    assert_eq!(
        parse_document(r#""q\" b\\ s\/ \b\f\n\r\t uA""#),
        Value::String("q\" b\\ s/ \u{8}\u{c}\n\r\t uA".into())
    );
}

#[test]
fn surrogate_pairs_combine() {
    assert_eq!(
        parse_document(r#""😀""#),
        Value::String("\u{1F600}".into())
    );
    // An unpaired half cannot live in a Rust string; it degrades to U+FFFD.
    assert_eq!(
        parse_document(r#""\ud800 after""#),
        Value::String("\u{FFFD} after".into())
    );
    assert_eq!(
        parse_document(r#""\ude00""#),
        Value::String("\u{FFFD}".into())
    );
}

#[test]
fn later_duplicate_key_wins() {
    assert_eq!(
        parse_document(r#"{"a": 1, "a": 2}"#),
        obj(&[("a", Value::Number(2.0))])
    );
}

#[rstest]
#[case::object(r#"{"a":1,"b":[true,null],"c":"x"}"#)]
#[case::deep(r#"{"a":{"b":{"c":{"d":[0]}}}}"#)]
#[case::numbers(r#"[0, -1, 2.5, 1e3, -4.25e-2, 100000]"#)]
#[case::strings(r#"["", "plain", "éA", "tab\there"]"#)]
#[case::unicode("{\"caf\u{e9}\": \"\u{1F680}\"}")]
#[case::whitespace("  {  \"a\"  :  [ 1 , 2 ]  }  ")]
fn agrees_with_reference_parser(#[case] input: &str) {
    let reference: serde_json::Value =
        serde_json::from_str(input).expect("reference parser accepts the fixture");
    assert_eq!(parse_document(input), from_serde(&reference));
}

#[test]
fn chunking_never_changes_the_result() {
    // Splits land inside escapes, numbers and a surrogate pair.
    let payload =
        "{\"a\":[1,2.5,-3e2],\"b\":\"x\\\"y\\u0041\\ud83d\\ude00\",\"c\":{\"d\":null}}";
    let whole = run(&["$"], payload).unwrap();
    for parts in 1..=payload.len() {
        let chunked =
            run_chunked_with(&["$"], payload, parts, SieveOptions::default()).unwrap();
        assert_eq!(chunked, whole, "differs when split into {parts} parts");
    }
}

#[test]
fn chunking_is_stable_for_sub_patterns() {
    let payload = r#"{"skip": [9, 9, 9], "take": {"x": [true, false]}}"#;
    let whole = run(&["$.take"], payload).unwrap();
    for parts in 1..=payload.len() {
        let chunked =
            run_chunked_with(&["$.take"], payload, parts, SieveOptions::default()).unwrap();
        assert_eq!(chunked, whole, "differs when split into {parts} parts");
    }
}
