//! The catalog — the single stateful object of the engine.
//!
//! Holds the four identifier-keyed indexes (frames, values, groups,
//! instances) plus a reverse iri index, each behind its own `RwLock`.
//!
//! ## Limitations
//!
//! - **Per-index locks only**: individual registrations and creations are
//!   safe under concurrent callers, but multi-step workflows (register a
//!   frame hierarchy, then build values against it) assume single-writer
//!   discipline.
//! - **No eviction**: values and instances are retained for the catalog's
//!   lifetime. Long-running hosts should scope a catalog per session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::group::{GroupId, GroupSpec, InstanceId, PerceptiveFrame, PerceptiveFrameInstance};
use crate::model::{ArgMap, FrameId, FrameSpec, NotionFrame, NotionValue, Value, ValueId};
use crate::{Error, Result};

/// In-memory registry of frames, values, groups and instances.
///
/// Construct one per process (or per test), pass it by reference into every
/// engine operation, drop it when done. There is no ambient global state.
#[derive(Default)]
pub struct Catalog {
    frames: RwLock<HashMap<FrameId, Arc<NotionFrame>>>,
    values: RwLock<HashMap<ValueId, Arc<NotionValue>>>,
    groups: RwLock<HashMap<GroupId, Arc<PerceptiveFrame>>>,
    instances: RwLock<HashMap<InstanceId, Arc<PerceptiveFrameInstance>>>,
    /// Registration order of instances, for deterministic listing.
    instance_order: RwLock<Vec<InstanceId>>,
    /// iri → instances whose value set carries that iri in a property.
    /// Maintained incrementally at instance creation so node classification
    /// is a point lookup instead of a full scan.
    iri_index: RwLock<HashMap<String, Vec<InstanceId>>>,
    next_value_id: AtomicU64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Register a frame, computing its derivation closure from the cached
    /// closures of its (already registered) parents.
    ///
    /// The closure holds the direct parents plus every *root* ancestor;
    /// intermediate ancestors are deliberately not included. Re-registering
    /// an id replaces the prior definition; values already constructed from
    /// the old definition are unaffected.
    pub fn register_frame(&self, spec: FrameSpec) -> Result<Arc<NotionFrame>> {
        let mut closure: HashMap<FrameId, Arc<NotionFrame>> = HashMap::new();
        {
            let frames = self.frames.read();
            for pid in &spec.derived_from {
                if *pid == spec.id {
                    return Err(Error::CyclicDerivation(spec.id.to_string()));
                }
                let parent = frames
                    .get(pid.as_str())
                    .cloned()
                    .ok_or_else(|| Error::FrameNotFound(pid.to_string()))?;
                for ancestor in parent.closure.values() {
                    if ancestor.is_root() {
                        closure.insert(ancestor.id.clone(), ancestor.clone());
                    }
                }
                closure.insert(pid.clone(), parent);
            }
        }
        if closure.contains_key(spec.id.as_str()) {
            return Err(Error::CyclicDerivation(spec.id.to_string()));
        }

        let frame = Arc::new(NotionFrame {
            id: spec.id,
            parameter: spec.parameter,
            notion_type: spec.notion_type,
            unit: spec.unit,
            derived_from: spec.derived_from,
            closure,
            converter: spec.converter,
            classifier: spec.classifier,
        });
        let replaced = self
            .frames
            .write()
            .insert(frame.id.clone(), frame.clone())
            .is_some();
        if replaced {
            debug!(frame = %frame.id, "frame definition replaced");
        } else {
            trace!(frame = %frame.id, parents = frame.derived_from.len(), "frame registered");
        }
        Ok(frame)
    }

    pub fn frame(&self, id: &str) -> Option<Arc<NotionFrame>> {
        self.frames.read().get(id).cloned()
    }

    pub fn frames(&self) -> Vec<Arc<NotionFrame>> {
        self.frames.read().values().cloned().collect()
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Construct a value: property = convert(args), classification =
    /// classify(property). Argument errors propagate; nothing is validated
    /// beyond what the frame's conversion rule requires.
    pub fn create_value(&self, frame_id: &str, args: ArgMap) -> Result<Arc<NotionValue>> {
        let frame = self
            .frame(frame_id)
            .ok_or_else(|| Error::FrameNotFound(frame_id.to_owned()))?;
        let property = frame.converter.apply(&frame.id, &args)?;
        let classification = frame.classifier.apply(&frame.id, &property)?;
        let id = ValueId(self.next_value_id.fetch_add(1, Ordering::Relaxed));
        let value = Arc::new(NotionValue {
            id,
            frame,
            args,
            property,
            classification,
        });
        self.values.write().insert(id, value.clone());
        trace!(value = %value.id, frame = %value.frame.id, "value created");
        Ok(value)
    }

    pub fn value(&self, id: ValueId) -> Option<Arc<NotionValue>> {
        self.values.read().get(&id).cloned()
    }

    pub fn values(&self) -> Vec<Arc<NotionValue>> {
        self.values.read().values().cloned().collect()
    }

    /// Resolve a value handle the external layer holds by id.
    pub fn expect_value(&self, id: ValueId) -> Result<Arc<NotionValue>> {
        self.value(id)
            .ok_or_else(|| Error::ValueNotFound(id.to_string()))
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Register a perceptive frame. Every member must already be registered;
    /// members are deduplicated by frame id.
    pub fn register_group(&self, spec: GroupSpec) -> Result<Arc<PerceptiveFrame>> {
        let mut members = HashMap::new();
        {
            let frames = self.frames.read();
            for mid in &spec.members {
                let frame = frames
                    .get(mid.as_str())
                    .cloned()
                    .ok_or_else(|| Error::FrameNotFound(mid.to_string()))?;
                members.insert(mid.clone(), frame);
            }
        }
        let group = Arc::new(PerceptiveFrame {
            id: spec.id,
            members,
            classifier: spec.classifier,
        });
        if self
            .groups
            .write()
            .insert(group.id.clone(), group.clone())
            .is_some()
        {
            debug!(group = %group.id, "perceptive frame replaced");
        }
        Ok(group)
    }

    pub fn group(&self, id: &str) -> Option<Arc<PerceptiveFrame>> {
        self.groups.read().get(id).cloned()
    }

    pub fn groups(&self) -> Vec<Arc<PerceptiveFrame>> {
        self.groups.read().values().cloned().collect()
    }

    // ========================================================================
    // Instances
    // ========================================================================

    /// Bind values into an instance, resolve the optional group, and feed
    /// every iri property of the instance's value set into the reverse index.
    pub fn create_instance(
        &self,
        id: impl Into<InstanceId>,
        group: Option<&str>,
        values: Vec<Arc<NotionValue>>,
    ) -> Result<Arc<PerceptiveFrameInstance>> {
        let id = id.into();
        let group = match group {
            Some(gid) => Some(
                self.group(gid)
                    .ok_or_else(|| Error::GroupNotFound(gid.to_owned()))?,
            ),
            None => None,
        };
        let instance = Arc::new(PerceptiveFrameInstance {
            id: id.clone(),
            group,
            values,
        });

        let mut iris: Vec<String> = instance
            .all_values()
            .iter()
            .flat_map(|nv| nv.property.values())
            .filter_map(|v| match v {
                Value::Iri(iri) => Some(iri.clone()),
                _ => None,
            })
            .collect();
        iris.sort();
        iris.dedup();
        {
            let mut index = self.iri_index.write();
            for iri in iris {
                let entry = index.entry(iri).or_default();
                if !entry.contains(&id) {
                    entry.push(id.clone());
                }
            }
        }

        let replaced = self
            .instances
            .write()
            .insert(id.clone(), instance.clone())
            .is_some();
        if !replaced {
            self.instance_order.write().push(id.clone());
        }
        trace!(instance = %id, values = instance.values.len(), "instance created");
        Ok(instance)
    }

    pub fn instance(&self, id: &str) -> Option<Arc<PerceptiveFrameInstance>> {
        self.instances.read().get(id).cloned()
    }

    /// All instances, in registration order.
    pub fn instances(&self) -> Vec<Arc<PerceptiveFrameInstance>> {
        let map = self.instances.read();
        self.instance_order
            .read()
            .iter()
            .filter_map(|id| map.get(id.as_str()).cloned())
            .collect()
    }

    /// Resolve an instance handle the external layer holds by id.
    pub fn expect_instance(&self, id: &str) -> Result<Arc<PerceptiveFrameInstance>> {
        self.instance(id)
            .ok_or_else(|| Error::InstanceNotFound(id.to_owned()))
    }

    /// Instances whose value set carries the given iri in a property.
    pub fn instances_referencing(&self, iri: &str) -> Vec<Arc<PerceptiveFrameInstance>> {
        let ids = match self.iri_index.read().get(iri) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };
        let map = self.instances.read();
        ids.iter()
            .filter_map(|id| map.get(id.as_str()).cloned())
            .collect()
    }
}
