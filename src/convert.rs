//! Conversion and classification rules.
//!
//! The original system attached arbitrary callables to schema nodes. Here
//! each frame carries one variant of a closed rule set instead, and
//! `apply()` dispatches on the tag. Adding a frame category means adding a
//! variant, not injecting executable data.

use serde::{Deserialize, Serialize};

use crate::model::{ArgMap, FrameId, PropertyMap, Value, arg};
use crate::{Error, Result};

/// Orientation tokens shared by every oriented conversion rule.
pub const DEPARTURE: &str = "DEPARTURE";
pub const ARRIVAL: &str = "ARRIVAL";

// ============================================================================
// Converter
// ============================================================================

/// Maps a raw argument mapping to a typed property mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Converter {
    /// Copy the literal argument `key` through unchanged.
    Identity { key: String },
    /// Parse the string literal `key` as an ISO-8601 date.
    ParseDate { key: String },
    /// Resolve the orientation of an arc end and emit one of two values.
    ///
    /// The orientation token comes from the literal arg `orientation`, or
    /// else from a referenced value whose frame parameter is `orientation`
    /// (reading that value's own raw `orientation` argument).
    Oriented {
        key: String,
        departure: Value,
        arrival: Value,
    },
    /// Whole years between two referenced date values, identified by the
    /// parameter names of their owning frames.
    YearsBetween {
        key: String,
        start: String,
        end: String,
    },
}

impl Converter {
    pub fn apply(&self, frame: &FrameId, args: &ArgMap) -> Result<PropertyMap> {
        let mut property = PropertyMap::new();
        match self {
            Converter::Identity { key } => {
                let v = require_literal(frame, args, key)?;
                property.insert(key.clone(), v.clone());
            }
            Converter::ParseDate { key } => {
                let v = require_literal(frame, args, key)?;
                let text = v.as_str().ok_or_else(|| Error::ArgumentType {
                    frame: frame.to_string(),
                    key: key.clone(),
                    expected: "STRING",
                    got: v.type_name(),
                })?;
                let date = text.parse().map_err(|_| Error::InvalidDate {
                    frame: frame.to_string(),
                    key: key.clone(),
                    input: text.to_owned(),
                })?;
                property.insert(key.clone(), Value::Date(date));
            }
            Converter::Oriented {
                key,
                departure,
                arrival,
            } => {
                let token = resolve_orientation(frame, args)?;
                let v = match token.as_str() {
                    DEPARTURE => departure.clone(),
                    ARRIVAL => arrival.clone(),
                    other => {
                        return Err(Error::UnknownToken {
                            frame: frame.to_string(),
                            token: other.to_owned(),
                        });
                    }
                };
                property.insert(key.clone(), v);
            }
            Converter::YearsBetween { key, start, end } => {
                let start_date = referenced_date(frame, args, start)?;
                let end_date = referenced_date(frame, args, end)?;
                let days = (end_date - start_date).num_days();
                // Calendar years via the 365.24-day mean year, floored.
                let years = (days as f64 / 365.24).floor() as i64;
                property.insert(key.clone(), Value::Int(years));
            }
        }
        Ok(property)
    }
}

/// Look up a required literal argument. A slot holding a value reference
/// instead of a literal is a type error, not a missing argument.
fn require_literal<'a>(frame: &FrameId, args: &'a ArgMap, key: &str) -> Result<&'a Value> {
    let slot = args.get(key).ok_or_else(|| Error::MissingArgument {
        frame: frame.to_string(),
        key: key.to_owned(),
    })?;
    slot.as_literal().ok_or_else(|| Error::ArgumentType {
        frame: frame.to_string(),
        key: key.to_owned(),
        expected: "LITERAL",
        got: slot.type_name(),
    })
}

/// Orientation token: literal arg first, then the raw args of a referenced
/// orientation value.
fn resolve_orientation(frame: &FrameId, args: &ArgMap) -> Result<String> {
    if let Some(v) = arg::literal(args, "orientation") {
        return v
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::ArgumentType {
                frame: frame.to_string(),
                key: "orientation".to_owned(),
                expected: "ENUMERATION",
                got: v.type_name(),
            });
    }
    for nv in arg::value_refs(args) {
        if nv.frame.parameter == "orientation" {
            if let Some(v) = arg::literal(&nv.args, "orientation").and_then(Value::as_str) {
                return Ok(v.to_owned());
            }
        }
    }
    Err(Error::MissingArgument {
        frame: frame.to_string(),
        key: "orientation".to_owned(),
    })
}

/// Date property of a referenced value whose frame parameter is `param`.
fn referenced_date(frame: &FrameId, args: &ArgMap, param: &str) -> Result<chrono::NaiveDate> {
    for nv in arg::value_refs(args) {
        if nv.frame.parameter == param {
            let v = nv.prop(param).ok_or_else(|| Error::MissingArgument {
                frame: frame.to_string(),
                key: param.to_owned(),
            })?;
            return v.as_date().ok_or_else(|| Error::ArgumentType {
                frame: frame.to_string(),
                key: param.to_owned(),
                expected: "DATE",
                got: v.type_name(),
            });
        }
    }
    Err(Error::MissingArgument {
        frame: frame.to_string(),
        key: param.to_owned(),
    })
}

// ============================================================================
// Classifier
// ============================================================================

/// Maps a computed property mapping to an optional classification value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Classifier {
    /// Leaf frames classify as nothing.
    Never,
    /// Classification is the property stored under `key`.
    Echo { key: String },
    /// Integer threshold over `property[key]`.
    Threshold {
        key: String,
        cutoff: i64,
        below: Value,
        at_or_above: Value,
    },
}

impl Classifier {
    pub fn apply(&self, frame: &FrameId, property: &PropertyMap) -> Result<Option<Value>> {
        match self {
            Classifier::Never => Ok(None),
            Classifier::Echo { key } => {
                let v = property.get(key).ok_or_else(|| Error::MissingArgument {
                    frame: frame.to_string(),
                    key: key.clone(),
                })?;
                Ok(Some(v.clone()))
            }
            Classifier::Threshold {
                key,
                cutoff,
                below,
                at_or_above,
            } => {
                let v = property.get(key).ok_or_else(|| Error::MissingArgument {
                    frame: frame.to_string(),
                    key: key.clone(),
                })?;
                let n = v.as_int().ok_or_else(|| Error::ArgumentType {
                    frame: frame.to_string(),
                    key: key.clone(),
                    expected: "INTEGER",
                    got: v.type_name(),
                })?;
                Ok(Some(if n < *cutoff {
                    below.clone()
                } else {
                    at_or_above.clone()
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Arg;

    fn fid() -> FrameId {
        FrameId::from("NF_Test")
    }

    #[test]
    fn test_identity_passthrough() {
        let mut args = ArgMap::new();
        args.insert("link".into(), Arg::Literal(Value::Iri("urn:n:1".into())));
        let conv = Converter::Identity { key: "link".into() };
        let prop = conv.apply(&fid(), &args).unwrap();
        assert_eq!(prop.get("link"), Some(&Value::Iri("urn:n:1".into())));
    }

    #[test]
    fn test_identity_missing_key() {
        let conv = Converter::Identity { key: "link".into() };
        let err = conv.apply(&fid(), &ArgMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingArgument { .. }));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let mut args = ArgMap::new();
        args.insert("date_of_birth".into(), Arg::from("not-a-date"));
        let conv = Converter::ParseDate {
            key: "date_of_birth".into(),
        };
        assert!(matches!(
            conv.apply(&fid(), &args),
            Err(Error::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_oriented_from_literal() {
        let conv = Converter::Oriented {
            key: "boundary".into(),
            departure: Value::Symbol("IS_BOUNDED_BY".into()),
            arrival: Value::Symbol("BOUNDS".into()),
        };
        let mut args = ArgMap::new();
        args.insert(
            "orientation".into(),
            Arg::Literal(Value::Symbol(ARRIVAL.into())),
        );
        let prop = conv.apply(&fid(), &args).unwrap();
        assert_eq!(prop.get("boundary"), Some(&Value::Symbol("BOUNDS".into())));
    }

    #[test]
    fn test_oriented_unknown_token() {
        let conv = Converter::Oriented {
            key: "boundary".into(),
            departure: Value::Symbol("IS_BOUNDED_BY".into()),
            arrival: Value::Symbol("BOUNDS".into()),
        };
        let mut args = ArgMap::new();
        args.insert(
            "orientation".into(),
            Arg::Literal(Value::Symbol("SIDEWAYS".into())),
        );
        assert!(matches!(
            conv.apply(&fid(), &args),
            Err(Error::UnknownToken { .. })
        ));
    }

    #[test]
    fn test_threshold() {
        let cls = Classifier::Threshold {
            key: "legal_age".into(),
            cutoff: 18,
            below: Value::Symbol("CHILD".into()),
            at_or_above: Value::Symbol("ADULT".into()),
        };
        let mut prop = PropertyMap::new();
        prop.insert("legal_age".into(), Value::Int(17));
        assert_eq!(
            cls.apply(&fid(), &prop).unwrap(),
            Some(Value::Symbol("CHILD".into()))
        );
        prop.insert("legal_age".into(), Value::Int(18));
        assert_eq!(
            cls.apply(&fid(), &prop).unwrap(),
            Some(Value::Symbol("ADULT".into()))
        );
    }

    #[test]
    fn test_threshold_rejects_non_integer_property() {
        let cls = Classifier::Threshold {
            key: "legal_age".into(),
            cutoff: 18,
            below: Value::Symbol("CHILD".into()),
            at_or_above: Value::Symbol("ADULT".into()),
        };
        let mut prop = PropertyMap::new();
        prop.insert("legal_age".into(), Value::Symbol("OLD".into()));
        assert!(matches!(
            cls.apply(&fid(), &prop),
            Err(Error::ArgumentType {
                expected: "INTEGER",
                got: "ENUMERATION",
                ..
            })
        ));
    }
}
