use crate::ids::ThemeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One catalog entry describing a visual style. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThemeRecord {
    pub id: ThemeId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Free-form mode label (`light`, `dark`, ...); matched case-insensitively.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    /// Preview image reference, relative or absolute.
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: String,
    /// Ordinal rank; defines the default sort of the gallery.
    #[cfg_attr(feature = "serde", serde(rename = "order", default))]
    pub rank: i64,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "flag::deserialize")
    )]
    pub featured: bool,
    /// The catalog writes this field as `"editor": 1`.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "editor", default, deserialize_with = "flag::deserialize")
    )]
    pub editor_pick: bool,
    /// Marketing bullet points shown in the details view, when present.
    #[cfg_attr(feature = "serde", serde(default))]
    pub features: Option<Vec<String>>,
}

/// Top-level shape of the catalog document: `{ "themes": [...] }`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogDocument {
    #[cfg_attr(feature = "serde", serde(default))]
    pub themes: Vec<ThemeRecord>,
}

/// Boolean flags in the catalog metadata are written inconsistently, either
/// as real booleans or as `0`/`1` integers. Accept both; absent means false.
#[cfg(feature = "serde")]
mod flag {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Flag>::deserialize(deserializer)? {
            Some(Flag::Bool(value)) => value,
            Some(Flag::Int(value)) => value != 0,
            None => false,
        })
    }
}
