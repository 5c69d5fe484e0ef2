//! PropertyMap — the computed key-value result of a frame conversion.

use super::Value;
use std::collections::HashMap;

/// A map of parameter names to computed values.
pub type PropertyMap = HashMap<String, Value>;
