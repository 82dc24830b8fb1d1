use std::collections::BTreeSet;
use std::fmt;

use crate::ids::ThemeId;

/// Per-user set of favorited theme identifiers.
///
/// Wire format is a comma-separated identifier string in a `favorites`
/// field; an empty string decodes to the empty set. The in-memory copy is
/// presumed correct immediately after a local toggle and stays authoritative
/// until a remote read contradicts it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: BTreeSet<ThemeId>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ThemeId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Decode the `favorites` field. Whitespace around identifiers is
    /// tolerated and empty segments are skipped.
    pub fn decode(field: &str) -> Self {
        Self {
            ids: field
                .split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(ThemeId::from)
                .collect(),
        }
    }

    /// Encode back to the comma-separated wire form.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for id in &self.ids {
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(id.as_str());
        }
        out
    }

    pub fn contains(&self, id: &ThemeId) -> bool {
        self.ids.contains(id)
    }

    /// Flip membership; returns whether the id is favorited afterwards.
    pub fn toggle(&mut self, id: &ThemeId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn insert(&mut self, id: ThemeId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &ThemeId) -> bool {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemeId> {
        self.ids.iter()
    }
}

impl fmt::Display for FavoriteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromIterator<ThemeId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = ThemeId>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_empty_string_is_empty_set() {
        assert!(FavoriteSet::decode("").is_empty());
        assert!(FavoriteSet::decode(" , ,").is_empty());
    }

    #[test]
    fn decode_skips_blank_segments_and_trims() {
        let set = FavoriteSet::decode("dark-mode, ocean ,,forest");
        assert_eq!(set.len(), 3);
        assert!(set.contains(&ThemeId::from("ocean")));
    }

    #[test]
    fn decode_deduplicates() {
        let set = FavoriteSet::decode("a,b,a");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn codec_round_trips() {
        let set = FavoriteSet::decode("forest,dark-mode,ocean");
        assert_eq!(FavoriteSet::decode(&set.encode()), set);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = FavoriteSet::new();
        let id = ThemeId::from("dark-mode");
        assert!(set.toggle(&id));
        assert!(set.contains(&id));
        assert!(!set.toggle(&id));
        assert!(set.is_empty());
    }
}
