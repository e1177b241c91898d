//! Structuring of whole explain responses.
//!
//! The explain endpoint answers with a JSON envelope whose plan text sits in a
//! few string fields. The functions here decode the envelope, replace those
//! fields with their structured form and encode the result again. Everything
//! else in the envelope is passed through unchanged, in its original order.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::parser::{parse_legacy_fields, parse_legacy_request, parse_plan_tree};
use crate::value::PlanValue;

const LEGACY_FIELDS: &str = "/root/description/fields";
const LEGACY_REQUEST: &str = "/root/children/0/description/request";
const CALCITE_STAGES: [&str; 2] = ["/calcite/logical", "/calcite/physical"];

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Invalid explain response: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("Explain response is missing '{0}'")]
    MissingField(&'static str),
    #[error("Unrecognized explain response, expected a 'calcite' or 'root' object")]
    UnrecognizedEnvelope,
    #[error("Failed to encode explain output: {0}")]
    Encode(#[source] serde_json::Error),
}

/// OutputOptions holds the options for writing structured explain output.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// The indent used for each level of the pretty-printed JSON.
    pub indent: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

impl OutputOptions {
    /// Indent with `width` spaces per level.
    pub fn with_indent_width(width: usize) -> Self {
        Self {
            indent: " ".repeat(width),
        }
    }
}

/// The two forms of explain response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainKind {
    /// `{"root": {...}}` from the legacy engine.
    Legacy,
    /// `{"calcite": {"logical": ..., "physical": ...}}` from the optimizer.
    Calcite,
}

impl ExplainKind {
    /// Pick the form of a decoded envelope. `calcite` wins if both keys are
    /// present.
    pub fn detect(envelope: &Value) -> Option<Self> {
        let object = envelope.as_object()?;
        if object.contains_key("calcite") {
            Some(ExplainKind::Calcite)
        } else if object.contains_key("root") {
            Some(ExplainKind::Legacy)
        } else {
            None
        }
    }
}

/// Quick check on a raw response body, before decoding, for whether it may be
/// an explain response at all.
pub fn looks_like_explain(raw: &str) -> bool {
    raw.contains("calcite") || raw.contains("root")
}

/// Structure a legacy explain response.
///
/// The root's `fields` list and the first child's `request` descriptor are
/// replaced by their structured form.
pub fn explain_legacy(envelope: &str) -> Result<String, ExplainError> {
    explain_legacy_with_options(envelope, &OutputOptions::default())
}

pub fn explain_legacy_with_options(
    envelope: &str,
    options: &OutputOptions,
) -> Result<String, ExplainError> {
    let mut data: Value = serde_json::from_str(envelope)?;
    structure_legacy(&mut data)?;
    to_pretty_json(&data, options)
}

/// Structure an optimizer explain response.
///
/// The `logical` and `physical` plan stages are each replaced by an ordered
/// mapping of their operators.
pub fn explain_calcite(envelope: &str) -> Result<String, ExplainError> {
    explain_calcite_with_options(envelope, &OutputOptions::default())
}

pub fn explain_calcite_with_options(
    envelope: &str,
    options: &OutputOptions,
) -> Result<String, ExplainError> {
    let mut data: Value = serde_json::from_str(envelope)?;
    structure_calcite(&mut data)?;
    to_pretty_json(&data, options)
}

/// Structure an explain response of either form.
pub fn explain(envelope: &str) -> Result<String, ExplainError> {
    explain_with_options(envelope, &OutputOptions::default())
}

pub fn explain_with_options(envelope: &str, options: &OutputOptions) -> Result<String, ExplainError> {
    let data = structure_envelope(serde_json::from_str(envelope)?)?;
    to_pretty_json(&data, options)
}

/// Structure an already decoded envelope of either form.
pub fn structure_envelope(mut data: Value) -> Result<Value, ExplainError> {
    match ExplainKind::detect(&data) {
        Some(ExplainKind::Calcite) => structure_calcite(&mut data)?,
        Some(ExplainKind::Legacy) => structure_legacy(&mut data)?,
        None => return Err(ExplainError::UnrecognizedEnvelope),
    }
    Ok(data)
}

fn structure_legacy(data: &mut Value) -> Result<(), ExplainError> {
    require_object(data, "root")?;
    tracing::trace!("structuring legacy explain");
    replace_text(data.pointer_mut(LEGACY_FIELDS), |s| {
        Some(parse_legacy_fields(s))
    });
    replace_text(data.pointer_mut(LEGACY_REQUEST), parse_legacy_request);
    Ok(())
}

fn structure_calcite(data: &mut Value) -> Result<(), ExplainError> {
    require_object(data, "calcite")?;
    for stage in CALCITE_STAGES {
        replace_text(data.pointer_mut(stage), |s| {
            let tree = parse_plan_tree(s);
            tracing::trace!(stage, operators = tree.len(), "structured plan stage");
            Some(PlanValue::Mapping(tree))
        });
    }
    Ok(())
}

fn require_object(data: &Value, key: &'static str) -> Result<(), ExplainError> {
    match data.get(key) {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(ExplainError::MissingField(key)),
    }
}

/// Replace a string field with its parsed form. Fields that are absent or
/// already structured are left alone.
fn replace_text(slot: Option<&mut Value>, parse: impl FnOnce(&str) -> Option<PlanValue>) {
    let Some(slot) = slot else {
        return;
    };
    let Some(text) = slot.as_str() else {
        return;
    };
    if let Some(parsed) = parse(text) {
        *slot = parsed.into();
    }
}

fn to_pretty_json(data: &Value, options: &OutputOptions) -> Result<String, ExplainError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(options.indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut serializer)
        .map_err(ExplainError::Encode)?;
    // serde_json only writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fixtures::{CALCITE_EXPLAIN, LEGACY_EXPLAIN};

    fn decode(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn test_explain_calcite() {
        let output = decode(&explain_calcite(CALCITE_EXPLAIN).unwrap());
        let logical = &output["calcite"]["logical"];
        assert_eq!(
            logical,
            &json!({
                "LogicalProject": {"name": "[$0]", "age": "[$1]"},
                "CalciteLogicalIndexScan": {"table": ["[OpenSearch, employees]"]}
            })
        );
        let scan = &output["calcite"]["physical"]["CalciteEnumerableIndexScan"];
        assert_eq!(scan["table"], json!(["[OpenSearch, employees]"]));
        assert_eq!(
            scan["PushDownContext"][0],
            json!({"PROJECT->": ["name", "age"]})
        );
        assert_eq!(
            scan["PushDownContext"][1]["OpenSearchRequestBuilder"]["sourceBuilder"]["_source"]["includes"],
            json!(["name", "age"])
        );
        assert_eq!(
            scan["PushDownContext"][1]["OpenSearchRequestBuilder"]["requestedTotalSize"],
            json!("200")
        );
    }

    #[test]
    fn test_explain_legacy() {
        let output = decode(&explain_legacy(LEGACY_EXPLAIN).unwrap());
        assert_eq!(output["root"]["name"], json!("ProjectOperator"));
        assert_eq!(
            output["root"]["description"]["fields"],
            json!(["firstname", "age"])
        );
        let request = &output["root"]["children"][0]["description"]["request"];
        assert_eq!(
            request["OpenSearchQueryRequest"]["indexName"],
            json!("accounts")
        );
        assert_eq!(
            request["OpenSearchQueryRequest"]["sourceBuilder"]["size"],
            json!(200)
        );
        assert_eq!(
            request["OpenSearchQueryRequest"]["searchDone"],
            json!("false")
        );
        assert_eq!(output["root"]["children"][0]["children"], json!([]));
    }

    #[test]
    fn test_output_is_two_space_indented() {
        let output = explain_calcite(r#"{"calcite": {"logical": "A(x=1)", "physical": ""}}"#).unwrap();
        assert_eq!(
            output,
            "{\n  \"calcite\": {\n    \"logical\": {\n      \"A\": {\n        \"x\": \"1\"\n      }\n    },\n    \"physical\": {}\n  }\n}"
        );
    }

    #[test]
    fn test_custom_indent() {
        let options = OutputOptions::with_indent_width(4);
        let output =
            explain_calcite_with_options(r#"{"calcite": {"logical": "", "physical": ""}}"#, &options)
                .unwrap();
        assert_eq!(
            output,
            "{\n    \"calcite\": {\n        \"logical\": {},\n        \"physical\": {}\n    }\n}"
        );
    }

    #[test]
    fn test_passthrough_keeps_order() {
        let output = explain_calcite(
            r#"{"calcite": {"physical": "B()", "extended": "raw", "logical": "A()"}, "status": 200}"#,
        )
        .unwrap();
        let keys: Vec<String> = decode(&output)["calcite"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["physical", "extended", "logical"]);
        assert_eq!(decode(&output)["calcite"]["extended"], json!("raw"));
        assert_eq!(decode(&output)["status"], json!(200));
    }

    #[test]
    fn test_rerun_is_noop() {
        let once = explain_calcite(CALCITE_EXPLAIN).unwrap();
        assert_eq!(explain_calcite(&once).unwrap(), once);
        let once = explain_legacy(LEGACY_EXPLAIN).unwrap();
        assert_eq!(explain_legacy(&once).unwrap(), once);
    }

    #[test]
    fn test_invalid_envelope() {
        assert!(matches!(
            explain_calcite("not json"),
            Err(ExplainError::Envelope(_))
        ));
        assert!(matches!(
            explain_calcite(r#"{"root": {}}"#),
            Err(ExplainError::MissingField("calcite"))
        ));
        assert!(matches!(
            explain_legacy(r#"{"root": "text"}"#),
            Err(ExplainError::MissingField("root"))
        ));
        assert!(matches!(
            explain(r#"{"other": 1}"#),
            Err(ExplainError::UnrecognizedEnvelope)
        ));
    }

    #[test]
    fn test_unshaped_request_is_kept() {
        let output = decode(
            &explain_legacy(
                r#"{"root": {"description": {"fields": "[a]"}, "children": [{"description": {"request": "???"}}]}}"#,
            )
            .unwrap(),
        );
        assert_eq!(
            output["root"]["children"][0]["description"]["request"],
            json!("???")
        );
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            ExplainKind::detect(&json!({"calcite": {}, "root": {}})),
            Some(ExplainKind::Calcite)
        );
        assert_eq!(
            ExplainKind::detect(&json!({"root": {}})),
            Some(ExplainKind::Legacy)
        );
        assert_eq!(ExplainKind::detect(&json!([1])), None);
        assert!(looks_like_explain(CALCITE_EXPLAIN));
        assert!(looks_like_explain(LEGACY_EXPLAIN));
        assert!(!looks_like_explain(r#"{"schema": [], "datarows": []}"#));
    }

    #[test]
    fn test_explain_selects_form() {
        assert_eq!(
            explain(CALCITE_EXPLAIN).unwrap(),
            explain_calcite(CALCITE_EXPLAIN).unwrap()
        );
        assert_eq!(
            explain(LEGACY_EXPLAIN).unwrap(),
            explain_legacy(LEGACY_EXPLAIN).unwrap()
        );
    }
}
