//! Notion frame — the schema node of the engine.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{NotionType, NotionUnit};
use crate::convert::{Classifier, Converter};

/// Identifier of a notion frame (caller-supplied, e.g. `"NF_Link"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub String);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FrameId {
    fn from(s: &str) -> Self {
        FrameId(s.to_owned())
    }
}

impl From<String> for FrameId {
    fn from(s: String) -> Self {
        FrameId(s)
    }
}

/// Lets frame indexes be queried with a plain `&str`.
impl Borrow<str> for FrameId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FrameId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything a caller supplies to register a frame.
#[derive(Debug, Clone)]
pub struct FrameSpec {
    pub id: FrameId,
    pub parameter: String,
    pub notion_type: NotionType,
    pub unit: NotionUnit,
    /// Directly referenced parent frames (must already be registered).
    pub derived_from: SmallVec<[FrameId; 2]>,
    pub converter: Converter,
    pub classifier: Classifier,
}

/// A registered schema node. Immutable after construction; re-registering
/// the same id replaces the definition but never mutates this one.
#[derive(Debug)]
pub struct NotionFrame {
    pub id: FrameId,
    /// Parameter name: the key under which the converted property lands.
    pub parameter: String,
    pub notion_type: NotionType,
    pub unit: NotionUnit,
    /// Declared direct parents, in declaration order.
    pub derived_from: SmallVec<[FrameId; 2]>,
    /// Cached derivation closure: direct parents plus every *root*
    /// (parent-less) ancestor. Intermediate ancestors are not included;
    /// callers needing them walk `derived_from` layer by layer.
    pub closure: HashMap<FrameId, Arc<NotionFrame>>,
    pub converter: Converter,
    pub classifier: Classifier,
}

impl NotionFrame {
    /// A root frame declares no derivation of its own.
    pub fn is_root(&self) -> bool {
        self.derived_from.is_empty()
    }

    /// Identifiers in the cached closure, sorted for stable output.
    pub fn closure_ids(&self) -> Vec<&FrameId> {
        let mut ids: Vec<&FrameId> = self.closure.keys().collect();
        ids.sort();
        ids
    }
}
