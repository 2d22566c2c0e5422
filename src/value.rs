//! The universal runtime value type threaded through binding resolution and
//! the filter pipeline.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use itertools::Itertools;
use std::{fmt, sync::Arc};

/// A value produced by resolving a binding or invoking a filter.
///
/// [Value::Unresolved] is a distinguished marker, not [Value::Null]: a null
/// is a legitimate value that renders as empty text, while an unresolved
/// value means "this name or filter produced nothing" and triggers
/// passthrough of the original placeholder source unless a filter declared
/// as unknown-handling consumes it. See [crate::filters] for the
/// propagation rules.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// An opaque host object, reachable only via reflected field/index
    /// access. Method invocation on these is forbidden (spec.md §4.C).
    Host(Arc<dyn HostObject>),
    /// No binding or filter produced a value for this expression.
    Unresolved,
}

/// A host-provided object reachable from templates through dotted/indexed
/// field access. Implementors expose only data, never behavior: there is no
/// `call` method here by design, so a template can never invoke logic on a
/// bound object (spec.md §1, §4.C, §7).
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Read a public field/property by name. Returns `None` if the object has
    /// no such field (this becomes [Value::Unresolved], not an error).
    fn field(&self, name: &str) -> Option<Value>;

    /// Names of all fields reachable for property-explosion purposes (see
    /// spec.md §4.C). Only relevant for the page Model; other host objects
    /// may return an empty slice.
    fn field_names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Value {
    /// Truthiness per spec.md §4.D: null, Unresolved, `false`, integer `0`,
    /// and the empty string are falsy. Everything else, including whitespace
    /// strings, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Unresolved => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Timestamp(_) => true,
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Host(_) => true,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Value::Unresolved)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Stringify a value for output. Unresolved values should never reach
    /// this; callers must handle passthrough before stringifying (the
    /// composer enforces this).
    pub fn stringify(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
            Value::Timestamp(ts) => ts.to_rfc3339(),
            Value::List(items) => format!("[{}]", items.iter().map(Value::stringify).join(", ")),
            Value::Map(map) => format!(
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{k}: {}", v.stringify())).join(", ")
            ),
            Value::Host(_) => String::new(),
            Value::Unresolved => String::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Render a float the way the engine's arithmetic filters expect: integral
/// floats still show a decimal point (`1.0`), matching `{{ 1 | add(1.0) }}`
/// style outputs, while non-integral floats print their natural form.
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Unresolved, Value::Unresolved) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T> From<Vec<T>> for Value
where
    Value: From<T>,
{
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Value::from).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Convert a [Value] to canonical JSON, the way the `json` filter does.
/// `null` becomes the JSON literal `null`; host objects have no JSON
/// representation and are also serialized as `null` since they carry no
/// serializable data of their own.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null | Value::Unresolved | Value::Host(_) => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Serializes through the canonical JSON representation ([`From<&Value> for
/// serde_json::Value`] above), the same indirection the teacher's
/// `cereal.rs` uses for its own value/AST `serde` support rather than
/// hand-rolling a field-by-field `Serialize` impl.
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::null(Value::Null, false)]
    #[case::unresolved(Value::Unresolved, false)]
    #[case::false_bool(Value::Boolean(false), false)]
    #[case::true_bool(Value::Boolean(true), true)]
    #[case::zero_int(Value::Integer(0), false)]
    #[case::nonzero_int(Value::Integer(1), true)]
    #[case::empty_string(Value::String(String::new()), false)]
    #[case::whitespace_string(Value::String(" ".into()), true)]
    #[case::empty_list(Value::List(vec![]), false)]
    #[case::nonempty_list(Value::List(vec![Value::Integer(1)]), true)]
    fn truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[test]
    fn null_is_not_unresolved() {
        assert_ne!(Value::Null, Value::Unresolved);
    }

    #[test]
    fn json_null_for_null_value() {
        let json: serde_json::Value = (&Value::Null).into();
        assert_eq!(json, serde_json::Value::Null);
    }

    #[test]
    fn serializes_through_json() {
        let value = Value::Map(IndexMap::from([("a".to_string(), Value::Integer(1))]));
        let rendered = serde_json::to_string(&value).unwrap();
        assert_eq!(rendered, "{\"a\":1}");
    }

    #[test]
    fn deserializes_from_json() {
        let value: Value = serde_json::from_str("{\"a\":1}").unwrap();
        assert_eq!(
            value,
            Value::Map(IndexMap::from([("a".to_string(), Value::Integer(1))]))
        );
    }
}
