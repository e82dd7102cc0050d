// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding of curves to the attribute they animate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an animated object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Binding of a curve to an object attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveBinding {
    /// Owning object
    pub object: ObjectId,
    /// Attribute name on the object
    pub attribute: String,
}

impl CurveBinding {
    /// Create a binding to an object attribute
    pub fn new(object: ObjectId, attribute: impl Into<String>) -> Self {
        Self {
            object,
            attribute: attribute.into(),
        }
    }
}
