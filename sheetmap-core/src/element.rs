//! Host element identifiers.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of the host element a map is drawn into.
///
/// # Examples
/// ```
/// use sheetmap_core::MapElement;
///
/// let element = MapElement::new("map");
/// assert_eq!(element.id(), "map");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct MapElement(String);

impl MapElement {
    /// Wrap an element identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The element identifier.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapElement {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
