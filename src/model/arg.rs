//! Tagged argument slots for value construction.
//!
//! Each raw argument is one of three shapes, fixed at construction time:
//! a literal, a reference to another notion value, or a list of references.
//! Conversion functions dispatch on the tag instead of inspecting types at
//! run time.

use std::sync::Arc;

use super::{NotionValue, Value};
use std::collections::HashMap;

/// One raw argument slot.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A plain literal (string, iri, symbol, date, ...).
    Literal(Value),
    /// A reference to an already-constructed notion value.
    Ref(Arc<NotionValue>),
    /// A list of references.
    RefList(Vec<Arc<NotionValue>>),
}

/// The raw argument mapping supplied to `Catalog::create_value`.
pub type ArgMap = HashMap<String, Arg>;

impl Arg {
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Arg::Literal(v) => Some(v),
            _ => None,
        }
    }

    /// All notion values referenced by this slot (empty for literals).
    pub fn refs(&self) -> impl Iterator<Item = &Arc<NotionValue>> {
        let slice: &[Arc<NotionValue>] = match self {
            Arg::Literal(_) => &[],
            Arg::Ref(v) => std::slice::from_ref(v),
            Arg::RefList(l) => l.as_slice(),
        };
        slice.iter()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Literal(v) => v.type_name(),
            Arg::Ref(_) => "VALUE",
            Arg::RefList(_) => "VALUE_LIST",
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Literal(v)
    }
}
impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Literal(Value::String(v.to_owned()))
    }
}
impl From<Arc<NotionValue>> for Arg {
    fn from(v: Arc<NotionValue>) -> Self {
        Arg::Ref(v)
    }
}
impl From<Vec<Arc<NotionValue>>> for Arg {
    fn from(v: Vec<Arc<NotionValue>>) -> Self {
        Arg::RefList(v)
    }
}

/// Read a literal slot out of an argument mapping.
pub fn literal<'a>(args: &'a ArgMap, key: &str) -> Option<&'a Value> {
    args.get(key).and_then(Arg::as_literal)
}

/// Every notion value referenced anywhere in the mapping.
pub fn value_refs(args: &ArgMap) -> impl Iterator<Item = &Arc<NotionValue>> {
    args.values().flat_map(Arg::refs)
}
