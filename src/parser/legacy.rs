//! Parsers for the legacy explain tree.
//!
//! The legacy engine describes its leaf node with a one-line request
//! descriptor:
//!
//! ```text
//! OpenSearchQueryRequest(indexName=accounts, sourceBuilder={"from":0,"size":200}, searchDone=false)
//! ```
//!
//! Legacy plans nest far less than optimizer plans, and this path splits the
//! descriptor more loosely than [`parse_params`](super::parse_params): a part
//! ends at `, ` only where the next part starts with `key=`, with no bracket
//! tracking.

use serde_json::Value;

use super::common;
use crate::value::{PlanMap, PlanValue};

const SOURCE_BUILDER: &str = "sourceBuilder";

/// Parse a legacy request descriptor into `{Type: {key: value, ...}}`.
///
/// The `sourceBuilder` value is decoded as JSON; all other values are kept
/// as text. Returns `None` if the descriptor is not shaped like
/// `Type(...)`, in which case callers keep the original text.
pub fn parse_legacy_request(descriptor: &str) -> Option<PlanValue> {
    // The descriptor never spans lines; anything past the first line is not
    // part of it.
    let first_line = descriptor.lines().next().unwrap_or_default();
    let shape = match common::request_descriptor(first_line) {
        Ok(Some(shape)) => shape,
        Ok(None) => return None,
        Err(e) => {
            tracing::debug!(error = %e, "request descriptor is not shaped like Type(...)");
            return None;
        }
    };

    let parts = match common::request_parts(shape.body) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!(error = %e, "could not split request descriptor");
            return None;
        }
    };

    let mut request = PlanMap::new();
    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            request.insert(part.to_string(), PlanValue::flag());
            continue;
        };
        let value = if key == SOURCE_BUILDER {
            decode_source_builder(value)
        } else {
            PlanValue::scalar(value)
        };
        request.insert(key.to_string(), value);
    }

    Some(PlanValue::single(shape.name, PlanValue::Mapping(request)))
}

fn decode_source_builder(value: &str) -> PlanValue {
    match serde_json::from_str::<Value>(value) {
        Ok(json) => PlanValue::Json(json),
        Err(e) => {
            tracing::debug!(error = %e, "sourceBuilder is not JSON, keeping it as text");
            PlanValue::scalar(value)
        }
    }
}

/// Parse the legacy `fields` list, e.g. `[name, age]`, into a list of names.
///
/// The list is never nested, so it is split on every comma.
pub fn parse_legacy_fields(fields: &str) -> PlanValue {
    let items = fields
        .trim_matches(['[', ']'])
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(PlanValue::scalar)
        .collect();
    PlanValue::Array(items)
}
