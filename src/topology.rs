//! Topology frames and the configuration-management classifiers.
//!
//! Six frames describe one end of an arc in the external assembly graph:
//! a `link` to the node it touches, an `orientation` (departure = source
//! end, arrival = target end), and four oriented roles derived from it
//! (boundary, enclosure, connection, selection). Two composite classifiers
//! infer the structural category of a relation arc and of a node.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use tracing::trace;

use crate::catalog::Catalog;
use crate::convert::{Classifier, Converter};
use crate::group::{GroupClassifier, GroupSpec, PerceptiveFrameInstance, ValuesByFrame};
use crate::model::{FrameSpec, NotionType, NotionUnit, NotionValue, Value};
use crate::{Error, Result};

// ============================================================================
// Frame and group identifiers (wire ids of the external store)
// ============================================================================

pub const NF_LINK: &str = "NF_Link";
pub const NF_ORIENTATION: &str = "NF_Orientation";
pub const NF_BOUNDARY: &str = "NF_Boundary";
pub const NF_ENCLOSURE: &str = "NF_Enclosure";
pub const NF_CONNECTION: &str = "NF_Connection";
pub const NF_SELECTION: &str = "NF_Selection";

pub const PF_RELATION: &str = "PF_Config_Mng_Relation";
pub const PF_NODE: &str = "PF_Config_Mng_Node";

// ============================================================================
// Classification enums
// ============================================================================

macro_rules! token_enum {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }

            /// The token as an enumeration value.
            pub fn symbol(&self) -> Value {
                Value::Symbol(self.as_str().to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> std::result::Result<Self, String> {
                match s {
                    $($token => Ok(Self::$variant),)+
                    other => Err(other.to_owned()),
                }
            }
        }
    };
}

token_enum! {
    /// Which end of an arc a value represents.
    OrientationClass {
        Departure => "DEPARTURE",
        Arrival => "ARRIVAL",
    }
}

token_enum! {
    BoundaryClass {
        Bounds => "BOUNDS",
        IsBoundedBy => "IS_BOUNDED_BY",
    }
}

token_enum! {
    EnclosureClass {
        Encloses => "ENCLOSES",
        IsEnclosedBy => "IS_ENCLOSED_BY",
    }
}

token_enum! {
    ConnectionClass {
        Down => "DOWN",
        Up => "UP",
    }
}

token_enum! {
    SelectionClass {
        Selects => "SELECTS",
        IsSelectedBy => "IS_SELECTED_BY",
    }
}

token_enum! {
    /// Structural category of a relation arc.
    RelationClass {
        NodeNodeConnection => "NODE_NODE_CONNECTION",
        NodeNodeEnclosure => "NODE_NODE_ENCLOSURE",
        NodePortBoundary => "NODE_PORT_BOUNDARY",
        PortPortConnection => "PORT_PORT_CONNECTION",
        PortPortSelection => "PORT_PORT_SELECTION",
        SlotModuleSelection => "SLOT_MODULE_SELECTION",
    }
}

token_enum! {
    /// Structural category of a node in the assembly graph.
    NodeClass {
        Node => "NODE",
        Slot => "SLOT",
        Module => "MODULE",
        Port => "PORT",
    }
}

// ============================================================================
// Frame registration
// ============================================================================

/// Register the six topology frames and the two composite classifiers, in
/// dependency order.
pub fn install(catalog: &Catalog) -> Result<()> {
    catalog.register_frame(FrameSpec {
        id: NF_LINK.into(),
        parameter: "link".into(),
        notion_type: NotionType::Iri,
        unit: NotionUnit::None,
        derived_from: smallvec![],
        converter: Converter::Identity { key: "link".into() },
        classifier: Classifier::Never,
    })?;

    catalog.register_frame(FrameSpec {
        id: NF_ORIENTATION.into(),
        parameter: "orientation".into(),
        notion_type: NotionType::Enumeration,
        unit: NotionUnit::None,
        derived_from: smallvec![NF_LINK.into()],
        converter: Converter::Identity {
            key: "orientation".into(),
        },
        classifier: Classifier::Echo {
            key: "orientation".into(),
        },
    })?;

    for (id, parameter, departure, arrival) in [
        (
            NF_BOUNDARY,
            "boundary",
            BoundaryClass::IsBoundedBy.symbol(),
            BoundaryClass::Bounds.symbol(),
        ),
        (
            NF_ENCLOSURE,
            "enclosure",
            EnclosureClass::IsEnclosedBy.symbol(),
            EnclosureClass::Encloses.symbol(),
        ),
        (
            NF_CONNECTION,
            "connection",
            ConnectionClass::Down.symbol(),
            ConnectionClass::Up.symbol(),
        ),
        (
            NF_SELECTION,
            "selection",
            SelectionClass::Selects.symbol(),
            SelectionClass::IsSelectedBy.symbol(),
        ),
    ] {
        catalog.register_frame(FrameSpec {
            id: id.into(),
            parameter: parameter.into(),
            notion_type: NotionType::Enumeration,
            unit: NotionUnit::None,
            derived_from: smallvec![NF_ORIENTATION.into()],
            converter: Converter::Oriented {
                key: parameter.into(),
                departure,
                arrival,
            },
            classifier: Classifier::Echo {
                key: parameter.into(),
            },
        })?;
    }

    catalog.register_group(GroupSpec {
        id: PF_RELATION.into(),
        members: vec![
            NF_ENCLOSURE.into(),
            NF_BOUNDARY.into(),
            NF_CONNECTION.into(),
            NF_SELECTION.into(),
        ],
        classifier: GroupClassifier::TopologyRelation,
    })?;

    catalog.register_group(GroupSpec {
        id: PF_NODE.into(),
        members: vec![],
        classifier: GroupClassifier::TopologyNode,
    })?;

    Ok(())
}

// ============================================================================
// Arc queries
// ============================================================================

/// Whether a value is a link pointing at the given node.
fn is_link_to(nv: &NotionValue, node: &str) -> bool {
    nv.frame.id.as_str() == NF_LINK && nv.prop("link").and_then(Value::as_iri) == Some(node)
}

/// First link found among a value's derived values.
pub fn linked_node(nv: &NotionValue) -> Option<String> {
    nv.derived_values()
        .iter()
        .find(|dnv| dnv.frame.id.as_str() == NF_LINK)
        .and_then(|dnv| dnv.prop("link").and_then(Value::as_iri).map(str::to_owned))
}

/// Every instance whose value set contains a link value.
pub fn arcs(catalog: &Catalog) -> Vec<Arc<PerceptiveFrameInstance>> {
    catalog
        .instances()
        .into_iter()
        .filter(|pfi| {
            pfi.all_values()
                .iter()
                .any(|nv| nv.frame.id.as_str() == NF_LINK)
        })
        .collect()
}

/// Every instance whose value set contains a link pointing at `node`.
pub fn arcs_for(catalog: &Catalog, node: &str) -> Vec<Arc<PerceptiveFrameInstance>> {
    catalog
        .instances_referencing(node)
        .into_iter()
        .filter(|pfi| pfi.all_values().iter().any(|nv| is_link_to(nv, node)))
        .collect()
}

// ============================================================================
// Relation classification
// ============================================================================

/// The oriented token of an arc-end value, read from the property stored
/// under the frame's own parameter.
fn end_token<'a>(nv: &'a NotionValue) -> Option<&'a str> {
    nv.parameter_value().and_then(Value::as_symbol)
}

fn ends<'a>(
    frame: &str,
    pair: &'a [Arc<NotionValue>],
) -> Result<(&'a NotionValue, &'a NotionValue)> {
    match pair {
        [a, b] => Ok((a.as_ref(), b.as_ref())),
        _ => Err(Error::MalformedArcPair {
            frame: frame.to_owned(),
            len: pair.len(),
        }),
    }
}

/// Classify one relation arc from its paired end values.
///
/// `values` maps frame ids to the two end values of the arc (index 0 the
/// departure end, index 1 the arrival end). The four frame kinds are tried
/// in priority order — enclosure, boundary, connection, selection — and the
/// first present kind decides. An inverted pair is a valid "no
/// classification" outcome, not an error.
pub fn classify_relation(
    catalog: &Catalog,
    values: &ValuesByFrame,
) -> Result<Option<RelationClass>> {
    if let Some(pair) = values.get(NF_ENCLOSURE) {
        let (a, b) = ends(NF_ENCLOSURE, pair)?;
        let valid = end_token(a) == Some(EnclosureClass::IsEnclosedBy.as_str())
            && end_token(b) == Some(EnclosureClass::Encloses.as_str());
        return Ok(valid.then_some(RelationClass::NodeNodeEnclosure));
    }

    if let Some(pair) = values.get(NF_BOUNDARY) {
        let (a, b) = ends(NF_BOUNDARY, pair)?;
        let valid = end_token(a) == Some(BoundaryClass::IsBoundedBy.as_str())
            && end_token(b) == Some(BoundaryClass::Bounds.as_str());
        return Ok(valid.then_some(RelationClass::NodePortBoundary));
    }

    if let Some(pair) = values.get(NF_CONNECTION) {
        let (a, b) = ends(NF_CONNECTION, pair)?;
        let valid = end_token(a) == Some(ConnectionClass::Down.as_str())
            && end_token(b) == Some(ConnectionClass::Up.as_str());
        if !valid {
            return Ok(None);
        }
        return Ok(Some(
            if both_ports(catalog, a, b) {
                RelationClass::PortPortConnection
            } else {
                RelationClass::NodeNodeConnection
            },
        ));
    }

    if let Some(pair) = values.get(NF_SELECTION) {
        let (a, b) = ends(NF_SELECTION, pair)?;
        let valid = end_token(a) == Some(SelectionClass::Selects.as_str())
            && end_token(b) == Some(SelectionClass::IsSelectedBy.as_str());
        if !valid {
            return Ok(None);
        }
        return Ok(Some(
            if both_ports(catalog, a, b) {
                RelationClass::PortPortSelection
            } else {
                RelationClass::SlotModuleSelection
            },
        ));
    }

    Ok(None)
}

/// Recursive step: do both end values resolve to port nodes?
fn both_ports(catalog: &Catalog, a: &NotionValue, b: &NotionValue) -> bool {
    classify_linked(catalog, a) == NodeClass::Port && classify_linked(catalog, b) == NodeClass::Port
}

/// Node classification of the node an end value links to. An end without a
/// link resolves to the generic node class.
fn classify_linked(catalog: &Catalog, nv: &NotionValue) -> NodeClass {
    match linked_node(nv) {
        Some(node) => classify_node(catalog, &node),
        None => NodeClass::Node,
    }
}

// ============================================================================
// Node classification
// ============================================================================

/// Classify a node of the external graph by scanning the arcs that
/// reference it.
///
/// For each referencing instance, the first direct non-link value whose
/// derived values carry a link to `node` contributes its property, keyed by
/// parameter name. A recorded boundary of BOUNDS makes the node a port; a
/// recorded selection of SELECTS a slot, of IS_SELECTED_BY a module;
/// anything else is a generic node.
pub fn classify_node(catalog: &Catalog, node: &str) -> NodeClass {
    let mut properties: HashMap<String, Value> = HashMap::new();

    for pfi in arcs_for(catalog, node) {
        'arc: for nv in &pfi.values {
            if nv.frame.id.as_str() == NF_LINK {
                continue;
            }
            for dnv in nv.derived_values() {
                if is_link_to(&dnv, node) {
                    if let Some(v) = nv.parameter_value() {
                        properties.insert(nv.frame.parameter.clone(), v.clone());
                    }
                    break 'arc;
                }
            }
        }
    }
    trace!(node, recorded = properties.len(), "node properties scanned");

    if let Some(boundary) = properties.get("boundary").and_then(Value::as_symbol) {
        if boundary == BoundaryClass::Bounds.as_str() {
            return NodeClass::Port;
        }
    }
    if let Some(selection) = properties.get("selection").and_then(Value::as_symbol) {
        if selection == SelectionClass::Selects.as_str() {
            return NodeClass::Slot;
        }
        if selection == SelectionClass::IsSelectedBy.as_str() {
            return NodeClass::Module;
        }
    }
    NodeClass::Node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arg, ArgMap};
    use smallvec::SmallVec;

    fn arg_map(pairs: Vec<(&str, Arg)>) -> ArgMap {
        pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
    }

    /// Build the oriented value chain for one arc end:
    /// link ← orientation ← role frame.
    fn arc_end(catalog: &Catalog, role_frame: &str, node: &str, orientation: OrientationClass) -> Arc<NotionValue> {
        let link = catalog
            .create_value(
                NF_LINK,
                arg_map(vec![("link", Arg::Literal(Value::Iri(node.into())))]),
            )
            .unwrap();
        let orient = catalog
            .create_value(
                NF_ORIENTATION,
                arg_map(vec![
                    ("orientation", Arg::Literal(orientation.symbol())),
                    ("NF_Link", Arg::Ref(link)),
                ]),
            )
            .unwrap();
        catalog
            .create_value(
                role_frame,
                arg_map(vec![("NF_Orientation", Arg::Ref(orient))]),
            )
            .unwrap()
    }

    fn pair_input(frame: &str, a: Arc<NotionValue>, b: Arc<NotionValue>) -> ValuesByFrame {
        let mut values = ValuesByFrame::new();
        values.insert(frame.into(), SmallVec::from_vec(vec![a, b]));
        values
    }

    #[test]
    fn test_oriented_frames_resolve_from_nested_orientation() {
        let catalog = Catalog::new();
        install(&catalog).unwrap();
        let end = arc_end(&catalog, NF_BOUNDARY, "urn:node:b", OrientationClass::Arrival);
        assert_eq!(end.prop("boundary"), Some(&BoundaryClass::Bounds.symbol()));
        assert_eq!(end.classification, Some(BoundaryClass::Bounds.symbol()));
    }

    #[test]
    fn test_enclosure_pair_ordering() {
        let catalog = Catalog::new();
        install(&catalog).unwrap();
        let dep = arc_end(&catalog, NF_ENCLOSURE, "urn:node:a", OrientationClass::Departure);
        let arr = arc_end(&catalog, NF_ENCLOSURE, "urn:node:b", OrientationClass::Arrival);

        let valid = pair_input(NF_ENCLOSURE, dep.clone(), arr.clone());
        assert_eq!(
            classify_relation(&catalog, &valid).unwrap(),
            Some(RelationClass::NodeNodeEnclosure)
        );

        let inverted = pair_input(NF_ENCLOSURE, arr, dep);
        assert_eq!(classify_relation(&catalog, &inverted).unwrap(), None);
    }

    #[test]
    fn test_malformed_pair_is_an_error() {
        let catalog = Catalog::new();
        install(&catalog).unwrap();
        let only = arc_end(&catalog, NF_ENCLOSURE, "urn:node:a", OrientationClass::Departure);
        let mut values = ValuesByFrame::new();
        values.insert(NF_ENCLOSURE.into(), SmallVec::from_vec(vec![only]));
        assert!(matches!(
            classify_relation(&catalog, &values),
            Err(Error::MalformedArcPair { len: 1, .. })
        ));
    }

    #[test]
    fn test_unreferenced_node_is_generic() {
        let catalog = Catalog::new();
        install(&catalog).unwrap();
        assert_eq!(classify_node(&catalog, "urn:node:ghost"), NodeClass::Node);
    }

    #[test]
    fn test_derived_chain_reaches_the_link() {
        let catalog = Catalog::new();
        install(&catalog).unwrap();
        let end = arc_end(&catalog, NF_BOUNDARY, "urn:node:b", OrientationClass::Arrival);
        assert_eq!(linked_node(&end), Some("urn:node:b".to_owned()));
    }
}
