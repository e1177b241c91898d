//! The structured form of parsed plan text.
//!
//! Plan parameters change shape depending on their content: the same key can
//! hold a plain string in one plan and a nested list or call in another.
//! [`PlanValue`] makes each of those shapes explicit.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// An insertion-ordered mapping from names to parsed values.
///
/// Inserting an existing key replaces its value but keeps its original
/// position.
pub type PlanMap = IndexMap<String, PlanValue>;

/// One parsed token of plan text.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanValue {
    /// Text kept as written, e.g. `$0`, `SUM($0)` or a simple list like
    /// `[1, 2, 3]`.
    Scalar(String),
    /// A bracketed list whose elements were structured individually.
    Array(Vec<PlanValue>),
    /// `key=value` parameters, calls (`name(...)`) and arrow structures.
    Mapping(PlanMap),
    /// A decoded JSON blob embedded in the plan text, or a boolean flag.
    Json(Value),
}

impl PlanValue {
    /// The value recorded for a parameter written without `=`.
    pub fn flag() -> Self {
        PlanValue::Json(Value::Bool(true))
    }

    pub fn scalar(s: impl Into<String>) -> Self {
        PlanValue::Scalar(s.into())
    }

    /// A one-entry mapping `{key: value}`.
    pub fn single(key: impl Into<String>, value: PlanValue) -> Self {
        let mut map = PlanMap::new();
        map.insert(key.into(), value);
        PlanValue::Mapping(map)
    }

    pub fn as_mapping(&self) -> Option<&PlanMap> {
        match self {
            PlanValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&PlanValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    pub fn to_json(&self) -> Value {
        match self {
            PlanValue::Scalar(s) => Value::String(s.clone()),
            PlanValue::Array(items) => Value::Array(items.iter().map(PlanValue::to_json).collect()),
            PlanValue::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            PlanValue::Json(v) => v.clone(),
        }
    }
}

impl From<PlanValue> for Value {
    fn from(value: PlanValue) -> Self {
        match value {
            PlanValue::Scalar(s) => Value::String(s),
            PlanValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            PlanValue::Mapping(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            PlanValue::Json(v) => v,
        }
    }
}

/// Serialized untagged: each variant is written as the JSON shape it
/// represents.
impl Serialize for PlanValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PlanValue::Scalar(s) => serializer.serialize_str(s),
            PlanValue::Array(items) => items.serialize(serializer),
            PlanValue::Mapping(map) => map.serialize(serializer),
            PlanValue::Json(v) => v.serialize(serializer),
        }
    }
}
