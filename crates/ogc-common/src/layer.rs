//! Tile layer descriptors listed by the layer catalog.

use serde::{Deserialize, Serialize};

/// A selectable tile layer. List order is display order only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub name: String,
    #[serde(default)]
    pub title: String,
}

impl LayerDescriptor {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }

    /// Title for display, falling back to the name when the catalog gave none.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

impl Default for LayerDescriptor {
    fn default() -> Self {
        Self::new("example:demo", "example:demo")
    }
}
