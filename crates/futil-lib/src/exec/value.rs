//! Template data values.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use indexmap::IndexMap;

static NIL: Value = Value::Nil;

/// Data a template executes against.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    /// Keyed collection, iterated in key order.
    Map(BTreeMap<String, Value>),
    /// Fixed set of named fields in declaration order.
    Record(IndexMap<String, Value>),
    Time(DateTime<Utc>),
}

impl Value {
    /// Go truth: zero values and empty collections are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Record(_) | Value::Time(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Time(_) => "time",
        }
    }

    /// Look up `.name` on this value.
    ///
    /// Maps yield nil for a missing key. Records and every other kind fail
    /// with the receiver's type name.
    pub fn field_ref(&self, name: &str) -> Result<&Value, FieldError> {
        match self {
            Value::Map(map) => Ok(map.get(name).unwrap_or(&NIL)),
            Value::Record(fields) => fields.get(name).ok_or(FieldError::Unknown {
                receiver: self.type_name(),
            }),
            Value::Nil => Err(FieldError::Nil),
            _ => Err(FieldError::Unknown {
                receiver: self.type_name(),
            }),
        }
    }

    /// Text produced by `{{.}}`. Differs from `Display` only for nil.
    pub fn render(&self) -> String {
        match self {
            Value::Nil => "<no value>".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Nil,
    Unknown { receiver: &'static str },
}

/// Go `%v` formatting. Nil nested inside a collection prints `<nil>`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, value) in fields.values().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("}")
            }
            Value::Time(t) => fmt_time(f, t),
        }
    }
}

fn fmt_time(f: &mut fmt::Formatter<'_>, t: &DateTime<Utc>) -> fmt::Result {
    write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S"))?;
    let nanos = t.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        write!(f, ".{}", fraction.trim_end_matches('0'))?;
    }
    f.write_str(" +0000 UTC")
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
