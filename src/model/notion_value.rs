//! Notion value — a concrete, immutable instance of a frame's attribute.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ArgMap, NotionFrame, PropertyMap, Value, arg};

/// Opaque value identifier, generated by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub u64);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A constructed value: raw args plus the computed property and
/// classification. Immutable once constructed — replacing the frame
/// definition afterwards does not touch values built from the old one.
#[derive(Debug)]
pub struct NotionValue {
    pub id: ValueId,
    pub frame: Arc<NotionFrame>,
    pub args: ArgMap,
    /// Result of the frame's conversion over `args`.
    pub property: PropertyMap,
    /// Result of the frame's classification over `property`.
    pub classification: Option<Value>,
}

impl NotionValue {
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.property.get(key)
    }

    /// The property stored under the frame's own parameter name.
    pub fn parameter_value(&self) -> Option<&Value> {
        self.property.get(self.frame.parameter.as_str())
    }

    /// Every notion value reachable through the argument graph.
    ///
    /// Empty when the owning frame declares no derivation. Otherwise a
    /// fully transitive walk: every referenced value, and every value
    /// referenced from *its* args, and so on. Deduplicated by value id;
    /// order follows argument-map iteration and is not significant.
    pub fn derived_values(&self) -> Vec<Arc<NotionValue>> {
        if self.frame.closure.is_empty() {
            return Vec::new();
        }
        let mut seen: HashSet<ValueId> = HashSet::new();
        seen.insert(self.id);
        let mut out: Vec<Arc<NotionValue>> = Vec::new();
        let mut pending: Vec<Arc<NotionValue>> = arg::value_refs(&self.args).cloned().collect();
        while let Some(nv) = pending.pop() {
            if !seen.insert(nv.id) {
                continue;
            }
            pending.extend(arg::value_refs(&nv.args).cloned());
            out.push(nv);
        }
        out
    }
}

impl fmt::Display for NotionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotionValue(frame=\"{}\", id={}", self.frame.id, self.id)?;
        if let Some(v) = self.parameter_value() {
            write!(f, ", {}={v}", self.frame.parameter)?;
        }
        if let Some(c) = &self.classification {
            write!(f, ", classification={c}")?;
        }
        write!(f, ")")
    }
}
