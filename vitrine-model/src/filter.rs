use std::fmt;

use crate::theme::ThemeRecord;

/// A single-choice filter value: everything, or one specific label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Case-insensitive match against a record label.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(want) => want.eq_ignore_ascii_case(value),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Only(value) => f.write_str(value),
        }
    }
}

/// The user-controlled filter over the catalog. Equality is by field; the
/// action dispatcher is the only mutator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub mode: Selection,
    pub category: Selection,
    pub search: String,
}

impl FilterState {
    /// Whether a record passes every active predicate.
    pub fn admits(&self, theme: &ThemeRecord) -> bool {
        if !self.mode.matches(&theme.mode) {
            return false;
        }
        if !self.category.matches(&theme.category) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        theme.name.to_lowercase().contains(&needle)
            || theme.description.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ThemeId;

    fn theme(mode: &str, category: &str, name: &str, description: &str) -> ThemeRecord {
        ThemeRecord {
            id: ThemeId::from(name),
            name: name.to_string(),
            description: description.to_string(),
            mode: mode.to_string(),
            category: category.to_string(),
            image: String::new(),
            rank: 0,
            featured: false,
            editor_pick: false,
            features: None,
        }
    }

    #[test]
    fn default_filter_admits_everything() {
        let filter = FilterState::default();
        assert!(filter.admits(&theme("Dark", "minimal", "Ink", "")));
    }

    #[test]
    fn mode_match_is_case_insensitive() {
        let filter = FilterState {
            mode: Selection::only("dark"),
            ..FilterState::default()
        };
        assert!(filter.admits(&theme("Dark", "minimal", "Ink", "")));
        assert!(!filter.admits(&theme("Light", "minimal", "Snow", "")));
    }

    #[test]
    fn search_matches_name_or_description() {
        let filter = FilterState {
            search: "OCEAN".to_string(),
            ..FilterState::default()
        };
        assert!(filter.admits(&theme("Dark", "nature", "Blue Ocean", "")));
        assert!(filter.admits(&theme("Dark", "nature", "Seafoam", "ocean greens")));
        assert!(!filter.admits(&theme("Dark", "nature", "Forest", "pine shades")));
    }

    #[test]
    fn all_predicates_must_pass() {
        let filter = FilterState {
            mode: Selection::only("dark"),
            category: Selection::only("nature"),
            search: "blue".to_string(),
        };
        assert!(filter.admits(&theme("dark", "Nature", "Blue Ocean", "")));
        assert!(!filter.admits(&theme("dark", "minimal", "Blue Ocean", "")));
        assert!(!filter.admits(&theme("dark", "nature", "Forest", "")));
    }
}
