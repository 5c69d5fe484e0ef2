//! # Notion Data Model
//!
//! Pure data: frames, values, argument slots, property maps, type tags.
//! These types cross every boundary: catalog ↔ conversion ↔ classification ↔
//! the external API layer.
//!
//! Design rule: no registries, no locks, no I/O here. State lives in
//! [`crate::catalog::Catalog`]; this module is plain immutable data.

pub mod arg;
pub mod frame;
pub mod notion_value;
pub mod property_map;
pub mod value;

pub use arg::{Arg, ArgMap};
pub use frame::{FrameId, FrameSpec, NotionFrame};
pub use notion_value::{NotionValue, ValueId};
pub use property_map::PropertyMap;
pub use value::{NotionType, NotionUnit, Value};
