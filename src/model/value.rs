//! Universal value type covering the declared notion type system.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declared type tag of a notion frame's parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotionType {
    None,
    Boolean,
    Date,
    Duration,
    Enumeration,
    Float,
    Integer,
    Iri,
    String,
}

/// Declared unit tag of a notion frame's parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotionUnit {
    None,
    Day,
    Degree,
    Millimeter,
    Month,
    Week,
    Year,
}

/// Concrete value held in a property map.
///
/// Covers every declared `NotionType`:
/// - Scalars: Bool, Int, Float, String
/// - References: Iri (external node identifier)
/// - Enumeration members: Symbol (token spelling, e.g. `"DEPARTURE"`)
/// - Temporal: Date, Duration
/// - Containers: List
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Iri(String),
    Symbol(String),
    Date(NaiveDate),
    Duration { days: i64 },
    List(Vec<Value>),
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Iri(_) => "IRI",
            Value::Symbol(_) => "ENUMERATION",
            Value::Date(_) => "DATE",
            Value::Duration { .. } => "DURATION",
            Value::List(_) => "LIST",
        }
    }

    /// Declared type tag this value satisfies.
    pub fn notion_type(&self) -> NotionType {
        match self {
            Value::Null | Value::List(_) => NotionType::None,
            Value::Bool(_) => NotionType::Boolean,
            Value::Int(_) => NotionType::Integer,
            Value::Float(_) => NotionType::Float,
            Value::String(_) => NotionType::String,
            Value::Iri(_) => NotionType::Iri,
            Value::Symbol(_) => NotionType::Enumeration,
            Value::Date(_) => NotionType::Date,
            Value::Duration { .. } => NotionType::Duration,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attempt to extract as i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Attempt to extract as &str (String, Iri and Symbol all carry text).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Iri(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Attempt to extract as an enumeration token.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Attempt to extract as an external identifier.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Value::Iri(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}
impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Value::Iri(s) => write!(f, "<{s}>"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Duration { days } => write!(f, "P{days}D"),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for NotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotionType::None => "NONE",
            NotionType::Boolean => "BOOLEAN",
            NotionType::Date => "DATE",
            NotionType::Duration => "DURATION",
            NotionType::Enumeration => "ENUMERATION",
            NotionType::Float => "FLOAT",
            NotionType::Integer => "INTEGER",
            NotionType::Iri => "IRI",
            NotionType::String => "STRING",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for NotionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotionUnit::None => "NONE",
            NotionUnit::Day => "DAY",
            NotionUnit::Degree => "DEGREE",
            NotionUnit::Millimeter => "MM",
            NotionUnit::Month => "MONTH",
            NotionUnit::Week => "WEEK",
            NotionUnit::Year => "YEAR",
        };
        write!(f, "{s}")
    }
}
