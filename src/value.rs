//! Resolved field values
//!
//! Numbers carry no int/float distinction; [`format_number`] decides the
//! display form, and the same rule is used by the serializer and by the
//! canonical strings that feed the key index.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// Distance from the nearest integer under which a number prints as an integer
pub const INTEGER_TOLERANCE: f64 = 1e-4;

/// A resolved DCL value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or unresolvable value
    #[default]
    Void,
    Number(f64),
    String(String),
    Bool(bool),
    Array(Vec<Value>),
}

/// The kind of a [`Value`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Void,
    Number,
    String,
    Bool,
    Array,
}

impl ValueKind {
    /// Returns the language-level name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Void => "void",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Array => "array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Void => ValueKind::Void,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Array(_) => ValueKind::Array,
        }
    }

    /// Returns true if the value is Void
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Returns true for the kinds that can designate a container key
    pub fn is_scalar_key(&self) -> bool {
        matches!(self, Value::Number(_) | Value::String(_))
    }

    /// Returns the number if this is a Number variant
    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// Returns a reference to the string if this is a String variant
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    /// Returns the boolean if this is a Bool variant
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Returns the elements if this is an Array variant
    pub fn as_array(&self) -> Option<&[Value]> {
        if let Value::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Plain-text form used for key-index lookups.
    ///
    /// Strings are unquoted and arrays are comma-joined without brackets, so
    /// `Value::String("42")` and `Value::Number(42.0)` share the same form.
    pub fn to_canonical_string(&self) -> String {
        match self {
            Value::Void => String::new(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Array(items) => items
                .iter()
                .map(Value::to_canonical_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// Formats a number the way it is written back to source.
///
/// Values within [`INTEGER_TOLERANCE`] of an integer print as that integer;
/// anything else prints in the shortest decimal form that reads back to the
/// same `f64`. Neither form uses exponent notation.
pub fn format_number(n: f64) -> String {
    let rounded = n.round();
    if (n - rounded).abs() < INTEGER_TOLERANCE {
        if rounded == 0.0 {
            // avoid "-0"
            return "0".to_string();
        }
        return format!("{}", rounded);
    }
    format!("{}", n)
}

/// Quotes a string, escaping the characters the lexer unescapes
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            _ => result.push(c),
        }
    }
    result.push('"');
    result
}

/// Source-literal form: quoted strings, bracketed arrays, Void as nothing
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(&escape_string(s)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Largest magnitude at which every integer is exactly representable
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Returns the number as an `i64` when it is integral and exactly representable
pub(crate) fn integral(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(n as i64)
    } else {
        None
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Void => serializer.serialize_unit(),
            Value::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
