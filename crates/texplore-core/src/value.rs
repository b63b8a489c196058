//! # Untyped Value Trees
//!
//! [`Value`] is the loosely-typed structured data used at the system
//! boundary: what a request body parses into before validation, and what a
//! translated response becomes before serialization.
//!
//! JSON cannot express every variant — sets, bytes, and non-string map keys
//! only arise on the response path (built by
//! [`from_native`](crate::translate::from_native)) or in tests. The
//! conversions at the JSON boundary are therefore asymmetric: arrays always
//! parse to lists, while sets serialize as arrays and map keys stringify.

use std::fmt;

/// An untyped value tree.
///
/// Integers are held as `i128` so that literals outside the 64-bit range
/// stay representable for bounds diagnostics instead of failing at parse
/// time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / JSON null.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer of any magnitude a request can carry.
    Int(i128),
    /// A floating-point number.
    Float(f64),
    /// A text string.
    String(String),
    /// A byte string.
    Bytes(Vec<u8>),
    /// An ordered collection.
    List(Vec<Value>),
    /// An unordered collection, deduplicated by equality.
    Set(Vec<Value>),
    /// A keyed collection; entries keep insertion order.
    Map(Vec<(Value, Value)>),
}

/// The shape of a [`Value`], used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// [`Value::Null`]
    Null,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Int`]
    Int,
    /// [`Value::Float`]
    Float,
    /// [`Value::String`]
    String,
    /// [`Value::Bytes`]
    Bytes,
    /// [`Value::List`]
    List,
    /// [`Value::Set`]
    Set,
    /// [`Value::Map`]
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bytes => "binary",
            ValueKind::List => "list",
            ValueKind::Set => "set",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

impl Value {
    /// The value's shape.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
            Value::Map(_) => ValueKind::Map,
        }
    }

    /// Look up an entry in a [`Value::Map`] by string key.
    ///
    /// Returns `None` for non-map values and for absent keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find_map(|(k, v)| match k {
                Value::String(s) if s == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Render a map key for use inside a validation message, without
    /// surrounding quotes: `3`, `dog`, `true`.
    pub fn key_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Null => "null".to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            other => other.to_json().to_string(),
        }
    }

    /// Convert to JSON. Sets become arrays, bytes become lossy-UTF-8
    /// strings, and non-string map keys stringify.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    serde_json::Value::from(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serde_json::Value::from(v)
                } else {
                    // Outside every JSON number representation; only
                    // reachable for hand-built trees.
                    serde_json::Value::String(i.to_string())
                }
            }
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
            Value::List(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => {
                let mut object = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    object.insert(key.key_display(), value.to_json());
                }
                serde_json::Value::Object(object)
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i as i128)
                } else if let Some(u) = n.as_u64() {
                    Value::Int(u as i128)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i as i128)
    }
}
