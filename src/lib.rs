//! # notions — Frame-Based Derivation & Classification Engine
//!
//! Typed "notion" schemas, concrete values computed through them, composite
//! classifications over groups of values, and graph-topology inference built
//! on top — used to classify parts, ports and connections of modular
//! assemblies, and separately to classify persons by legal age and gender.
//!
//! ## Design Principles
//!
//! 1. **One stateful object**: all registries live in [`Catalog`], passed by
//!    reference into every operation — no ambient global state
//! 2. **Clean data**: `NotionFrame`, `NotionValue`, `Value`, `Arg` are plain
//!    immutable records that cross all boundaries
//! 3. **Closed rules**: conversion and classification are tagged variants
//!    with explicit dispatch, never executable data on schema nodes
//! 4. **No I/O**: the network layer and the triple store are external
//!    collaborators; this crate computes and returns
//!
//! ## Quick Start
//!
//! ```rust
//! use notions::{Catalog, topology};
//! use notions::model::{Arg, Value};
//!
//! # fn example() -> notions::Result<()> {
//! let catalog = Catalog::new();
//! topology::install(&catalog)?;
//!
//! // One end of an arc: a link wrapped by an orientation.
//! let link = catalog.create_value(topology::NF_LINK, [
//!     ("link".to_owned(), Arg::Literal(Value::Iri("urn:node:b".into()))),
//! ].into_iter().collect())?;
//! let orientation = catalog.create_value(topology::NF_ORIENTATION, [
//!     ("orientation".to_owned(), Arg::Literal(Value::Symbol("ARRIVAL".into()))),
//!     ("NF_Link".to_owned(), Arg::Ref(link)),
//! ].into_iter().collect())?;
//! let boundary = catalog.create_value(topology::NF_BOUNDARY, [
//!     ("NF_Orientation".to_owned(), Arg::Ref(orientation)),
//! ].into_iter().collect())?;
//!
//! assert_eq!(boundary.prop("boundary"), Some(&Value::Symbol("BOUNDS".into())));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod catalog;
pub mod convert;
pub mod export;
pub mod group;
pub mod legal;
pub mod model;
pub mod topology;

// ============================================================================
// Re-exports: Model (the data)
// ============================================================================

pub use model::{
    Arg, ArgMap, FrameId, FrameSpec, NotionFrame, NotionType, NotionUnit, NotionValue,
    PropertyMap, Value, ValueId,
};

// ============================================================================
// Re-exports: Catalog and groups
// ============================================================================

pub use catalog::Catalog;
pub use convert::{Classifier, Converter};
pub use group::{
    GroupClass, GroupClassifier, GroupId, GroupSpec, InstanceId, PerceptiveFrame,
    PerceptiveFrameInstance, ValuesByFrame,
};

// ============================================================================
// Re-exports: Domain classifications
// ============================================================================

pub use legal::PersonClass;
pub use topology::{NodeClass, OrientationClass, RelationClass};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unresolved frame reference: {0}")]
    FrameNotFound(String),

    #[error("unresolved group reference: {0}")]
    GroupNotFound(String),

    #[error("unresolved instance reference: {0}")]
    InstanceNotFound(String),

    #[error("unresolved value reference: {0}")]
    ValueNotFound(String),

    #[error("frame {frame}: missing argument '{key}'")]
    MissingArgument { frame: String, key: String },

    #[error("frame {frame}: argument '{key}' expected {expected}, got {got}")]
    ArgumentType {
        frame: String,
        key: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("frame {frame}: '{input}' is not a date ('{key}')")]
    InvalidDate {
        frame: String,
        key: String,
        input: String,
    },

    #[error("frame {frame}: unknown token '{token}'")]
    UnknownToken { frame: String, token: String },

    #[error("relation pair for {frame} has {len} ends, expected 2")]
    MalformedArcPair { frame: String, len: usize },

    #[error("cyclic derivation: frame {0} would reach itself")]
    CyclicDerivation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
