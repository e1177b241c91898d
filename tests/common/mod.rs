//! Common test utilities for structuring tests

use opensearch_explain::{PlanValue, explain, parse_plan_tree};
use serde_json::Value;

/// Parse a plan stage and verify that the structured tree survives encoding
/// to JSON text and decoding again. Returns the tree as JSON.
pub fn roundtrip_plan(input: &str) -> Value {
    let tree = PlanValue::Mapping(parse_plan_tree(input));
    let expected = tree.to_json();

    let text = match serde_json::to_string_pretty(&tree) {
        Ok(text) => text,
        Err(e) => {
            println!("Error encoding plan:\n{input}");
            panic!("{}", e);
        }
    };
    let decoded: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(
        decoded, expected,
        "Expected:\n---\n{expected:#}\n---\nActual:\n---\n{decoded:#}\n---"
    );
    expected
}

/// Structure an explain response and decode the output.
pub fn structure(envelope: &str) -> Value {
    match explain(envelope) {
        Ok(output) => serde_json::from_str(&output).unwrap(),
        Err(e) => {
            println!("Error structuring explain response:\n{envelope}");
            panic!("{}", e);
        }
    }
}

/// Operator names of a structured stage, in order.
pub fn operators(stage: &Value) -> Vec<&str> {
    stage
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
