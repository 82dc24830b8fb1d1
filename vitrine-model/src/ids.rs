use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier of a theme record.
///
/// Identifiers come from the catalog document and survive across sessions;
/// the favorite set is keyed by them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ThemeId(String);

impl ThemeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThemeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ThemeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
