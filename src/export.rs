//! Read-only JSON views for the external schema-driven API layer.
//!
//! The engine owns no wire format; these are plain `serde_json` trees the
//! collaborating query layer serves as-is.

use serde_json::{Value as Json, json};

use crate::catalog::Catalog;
use crate::group::PerceptiveFrameInstance;
use crate::model::{Arg, NotionFrame, NotionValue, Value};

/// A literal as natural JSON (dates as ISO strings, symbols as strings).
pub fn literal_json(v: &Value) -> Json {
    match v {
        Value::Null => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::String(s) | Value::Iri(s) | Value::Symbol(s) => json!(s),
        Value::Date(d) => json!(d.to_string()),
        Value::Duration { days } => json!({ "days": days }),
        Value::List(l) => Json::Array(l.iter().map(literal_json).collect()),
    }
}

pub fn frame_json(frame: &NotionFrame) -> Json {
    json!({
        "id": frame.id.as_str(),
        "parameter": frame.parameter,
        "type": frame.notion_type.to_string(),
        "unit": frame.unit.to_string(),
        "derivedFrom": frame.derived_from.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        "closure": frame.closure_ids().iter().map(|id| id.as_str()).collect::<Vec<_>>(),
    })
}

pub fn value_json(value: &NotionValue) -> Json {
    let args: serde_json::Map<String, Json> = value
        .args
        .iter()
        .map(|(k, arg)| {
            let v = match arg {
                Arg::Literal(v) => literal_json(v),
                Arg::Ref(nv) => json!({ "value": nv.id.0 }),
                Arg::RefList(l) => {
                    Json::Array(l.iter().map(|nv| json!({ "value": nv.id.0 })).collect())
                }
            };
            (k.clone(), v)
        })
        .collect();
    json!({
        "id": value.id.0,
        "frame": value.frame.id.as_str(),
        "args": args,
        "property": value.property.iter()
            .map(|(k, v)| (k.clone(), literal_json(v)))
            .collect::<serde_json::Map<_, _>>(),
        "classification": value.classification.as_ref().map(literal_json),
    })
}

pub fn instance_json(instance: &PerceptiveFrameInstance) -> Json {
    json!({
        "id": instance.id.as_str(),
        "group": instance.group.as_ref().map(|g| g.id.as_str()),
        "values": instance.values.iter().map(|nv| nv.id.0).collect::<Vec<_>>(),
        "allValues": instance.all_values().iter().map(|nv| nv.id.0).collect::<Vec<_>>(),
    })
}

/// The whole catalog as one JSON document.
pub fn catalog_json(catalog: &Catalog) -> Json {
    let mut frames: Vec<Json> = catalog.frames().iter().map(|f| frame_json(f)).collect();
    frames.sort_by_key(|f| f["id"].as_str().map(str::to_owned));
    let groups: Vec<Json> = {
        let mut gs = catalog.groups();
        gs.sort_by(|a, b| a.id.cmp(&b.id));
        gs.iter()
            .map(|g| {
                let mut members: Vec<&str> = g.members.keys().map(|id| id.as_str()).collect();
                members.sort();
                json!({
                    "id": g.id.as_str(),
                    "members": members,
                    "classifier": g.classifier,
                })
            })
            .collect()
    };
    json!({
        "frames": frames,
        "groups": groups,
        "instances": catalog.instances().iter().map(|i| instance_json(i)).collect::<Vec<_>>(),
    })
}
