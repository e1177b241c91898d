//! Parameter lists and parameter values of plan operators.
//!
//! An operator line such as
//!
//! ```text
//! CalciteEnumerableIndexScan(table=[[OpenSearch, employees]], PushDownContext=[[PROJECT->[name, age]], OpenSearchRequestBuilder(sourceBuilder={"from":0}, pageSize=null)])
//! ```
//!
//! carries a `key=value` list whose values may be simple lists, lists of
//! lists, arrow structures (`PROJECT->[...]`), nested calls with their own
//! parameter lists, or JSON objects. The functions here turn that into
//! [`PlanValue`]s, keeping anything that does not clearly need structure as
//! raw text.

use serde_json::Value;

use super::scan::{find_first_unescaped, is_wrapped, split_respecting_nesting, unwrap_inner};
use crate::value::{PlanMap, PlanValue};

const ARROW: &str = "->";

/// Parse a `k=v, k=v, ...` parameter list.
///
/// Parts without a top-level `=` become boolean flags keyed by their own
/// text. Values are classified with [`classify_value`].
///
/// ```rust
/// use opensearch_explain::parser::parse_params;
/// use opensearch_explain::PlanValue;
///
/// let params = parse_params("group=[{}], sum(aa)=[SUM($0)]");
/// assert_eq!(params["group"], PlanValue::Array(vec![PlanValue::Mapping(Default::default())]));
/// assert_eq!(params["sum(aa)"], PlanValue::scalar("[SUM($0)]"));
/// ```
pub fn parse_params(params: &str) -> PlanMap {
    let mut result = PlanMap::new();

    for part in split_respecting_nesting(params, ',') {
        match find_first_unescaped(part, '=') {
            Some(pos) if pos > 0 => {
                let key = part[..pos].trim();
                let value = part[pos + 1..].trim();
                result.insert(key.to_string(), classify_value(value));
            }
            _ => {
                result.insert(part.to_string(), PlanValue::flag());
            }
        }
    }

    result
}

/// Classify a single value token.
///
/// Brace-wrapped tokens that are valid JSON are decoded. Bracketed lists are
/// structured only when they contain arrow structures or nested lists; a flat
/// list like `[1, 2, 3]` stays as written. Calls are structured only when
/// they carry `key=value` parameters, so `SUM($0)` stays as written.
pub fn classify_value(token: &str) -> PlanValue {
    let token = token.trim();

    if is_wrapped(token, '{', '}') {
        match serde_json::from_str::<Value>(token) {
            Ok(json) => return PlanValue::Json(json),
            Err(e) => {
                tracing::debug!(error = %e, token, "brace value is not JSON, classifying as text");
            }
        }
    }

    if is_wrapped(token, '[', ']') {
        return classify_array(token);
    }

    if let Some(call) = classify_call(token) {
        return call;
    }

    PlanValue::scalar(token)
}

fn classify_array(token: &str) -> PlanValue {
    let inner = unwrap_inner(token);

    if inner.is_empty() {
        return PlanValue::Array(Vec::new());
    }
    if inner == "{}" {
        return PlanValue::Array(vec![PlanValue::Mapping(PlanMap::new())]);
    }

    if inner.contains(ARROW) {
        if !inner.starts_with('[') {
            return parse_arrow(inner);
        }
        let items = split_respecting_nesting(inner, ',')
            .into_iter()
            .map(|item| {
                if is_wrapped(item, '[', ']') && item.contains(ARROW) {
                    parse_arrow(unwrap_inner(item))
                } else {
                    classify_value(item)
                }
            })
            .collect();
        return PlanValue::Array(items);
    }

    let items = split_respecting_nesting(inner, ',');
    if !items.iter().any(|item| is_wrapped(item, '[', ']')) {
        return PlanValue::scalar(token);
    }
    PlanValue::Array(items.into_iter().map(classify_value).collect())
}

/// `name(k=v, ...)` with at least one top-level `=` between the parentheses.
fn classify_call(token: &str) -> Option<PlanValue> {
    if !token.ends_with(')') {
        return None;
    }
    let open = token.find('(')?;
    let close = token.len() - 1;
    if open >= close {
        return None;
    }
    let interior = &token[open + 1..close];
    find_first_unescaped(interior, '=')?;

    let name = token[..open].trim();
    let params = parse_params(interior.trim());
    Some(PlanValue::single(name, PlanValue::Mapping(params)))
}

/// Parse an arrow structure `KEY->VALUE`.
///
/// A bracketed value becomes a list of its top-level elements; anything else
/// is kept as text. Content with no arrow after the first character is
/// returned unchanged.
///
/// ```rust
/// use opensearch_explain::parser::parse_arrow;
/// use opensearch_explain::PlanValue;
///
/// let parsed = parse_arrow("PROJECT->[name, age]");
/// assert_eq!(
///     parsed.get("PROJECT->"),
///     Some(&PlanValue::Array(vec![PlanValue::scalar("name"), PlanValue::scalar("age")]))
/// );
/// ```
pub fn parse_arrow(content: &str) -> PlanValue {
    let pos = match content.find(ARROW) {
        Some(pos) if pos > 0 => pos,
        _ => return PlanValue::scalar(content),
    };

    let key = format!("{}{ARROW}", content[..pos].trim());
    let value = content[pos + ARROW.len()..].trim();

    if is_wrapped(value, '[', ']') {
        let fields = split_respecting_nesting(unwrap_inner(value), ',')
            .into_iter()
            .map(PlanValue::scalar)
            .collect();
        PlanValue::single(key, PlanValue::Array(fields))
    } else {
        PlanValue::single(key, PlanValue::scalar(value))
    }
}
