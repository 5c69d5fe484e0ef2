//! Perceptive frames — named groups of notion frames that classify as a
//! unit — and their bound instances.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::Catalog;
use crate::model::{FrameId, NotionFrame, NotionValue, ValueId};
use crate::{Error, Result, legal, topology};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a perceptive frame (e.g. `"PF_Config_Mng_Relation"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub String);

/// Identifier of a perceptive frame instance (caller-supplied, one per arc).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub String);

macro_rules! string_id {
    ($t:ty) => {
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
        impl From<&str> for $t {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
        impl From<String> for $t {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
        impl Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(GroupId);
string_id!(InstanceId);

// ============================================================================
// Classification dispatch
// ============================================================================

/// Notion values grouped by owning frame id — the input of a composite
/// classification. Relation arcs carry exactly two values per frame
/// (the departure end and the arrival end).
pub type ValuesByFrame = HashMap<FrameId, SmallVec<[Arc<NotionValue>; 2]>>;

/// Closed set of composite classification rules a perceptive frame can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupClassifier {
    /// Structural category of a relation arc.
    TopologyRelation,
    /// Structural category of a node; needs the node identifier.
    TopologyNode,
    /// Legal person category from age and gender.
    LegalPerson,
}

/// Result of a composite classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "class")]
pub enum GroupClass {
    Relation(topology::RelationClass),
    Node(topology::NodeClass),
    Person(legal::PersonClass),
}

// ============================================================================
// PerceptiveFrame
// ============================================================================

/// Everything a caller supplies to register a perceptive frame.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub id: GroupId,
    pub members: Vec<FrameId>,
    pub classifier: GroupClassifier,
}

/// A named, deduplicated set of member frames plus one classification rule.
#[derive(Debug)]
pub struct PerceptiveFrame {
    pub id: GroupId,
    pub members: HashMap<FrameId, Arc<NotionFrame>>,
    pub classifier: GroupClassifier,
}

impl PerceptiveFrame {
    /// Run this group's composite classification.
    ///
    /// `node` is required by classifiers that resolve a node identifier
    /// recursively (currently [`GroupClassifier::TopologyNode`]).
    pub fn classify(
        &self,
        catalog: &Catalog,
        values: &ValuesByFrame,
        node: Option<&str>,
    ) -> Result<Option<GroupClass>> {
        match self.classifier {
            GroupClassifier::TopologyRelation => Ok(topology::classify_relation(catalog, values)?
                .map(GroupClass::Relation)),
            GroupClassifier::TopologyNode => {
                let node = node.ok_or_else(|| Error::MissingArgument {
                    frame: self.id.to_string(),
                    key: "node".to_owned(),
                })?;
                Ok(Some(GroupClass::Node(topology::classify_node(
                    catalog, node,
                ))))
            }
            GroupClassifier::LegalPerson => {
                Ok(legal::classify_person(&self.id, values)?.map(GroupClass::Person))
            }
        }
    }
}

// ============================================================================
// PerceptiveFrameInstance
// ============================================================================

/// A concrete binding of notion values to a perceptive frame. One instance
/// typically represents one arc of the external graph.
#[derive(Debug)]
pub struct PerceptiveFrameInstance {
    pub id: InstanceId,
    pub group: Option<Arc<PerceptiveFrame>>,
    /// Directly bound values, in binding order.
    pub values: Vec<Arc<NotionValue>>,
}

impl PerceptiveFrameInstance {
    /// Direct values plus everything reachable through each direct value's
    /// derived-value traversal, deduplicated by value id. Direct values come
    /// first.
    pub fn all_values(&self) -> Vec<Arc<NotionValue>> {
        let mut seen: HashSet<ValueId> = HashSet::new();
        let mut out: Vec<Arc<NotionValue>> = Vec::new();
        for nv in &self.values {
            if seen.insert(nv.id) {
                out.push(nv.clone());
            }
        }
        for nv in &self.values {
            for dnv in nv.derived_values() {
                if seen.insert(dnv.id) {
                    out.push(dnv);
                }
            }
        }
        out
    }
}
