//! Pure derivation of the visible theme list.

use vitrine_model::{FilterState, ThemeRecord};

/// Apply the filter and curated ordering to a catalog snapshot. The input is
/// never mutated; ties in `rank` keep catalog order (the sort is stable).
pub fn compute_visible<'a>(catalog: &'a [ThemeRecord], filter: &FilterState) -> Vec<&'a ThemeRecord> {
    let mut visible: Vec<&ThemeRecord> = catalog.iter().filter(|t| filter.admits(t)).collect();
    visible.sort_by_key(|t| t.rank);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::builders::theme;
    use vitrine_model::Selection;

    fn catalog() -> Vec<ThemeRecord> {
        vec![
            theme("c", "Coal", "dark", "minimal", 3),
            theme("a", "Arctic", "light", "minimal", 1),
            theme("b", "Basalt", "dark", "bold", 1),
        ]
    }

    #[test]
    fn visible_is_a_sorted_subset() {
        let catalog = catalog();
        let mut filter = FilterState::default();
        filter.mode = Selection::only("dark");

        let visible = compute_visible(&catalog, &filter);
        let ids: Vec<&str> = visible.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn equal_ranks_keep_catalog_order() {
        let catalog = catalog();
        let visible = compute_visible(&catalog, &FilterState::default());
        let ids: Vec<&str> = visible.iter().map(|t| t.id.as_str()).collect();
        // "a" and "b" share rank 1 and keep their catalog order.
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn search_matches_name_or_description() {
        let mut catalog = catalog();
        catalog[0].description = "charcoal panels".to_string();

        let mut filter = FilterState::default();
        filter.search = "CHARCOAL".to_string();

        let visible = compute_visible(&catalog, &filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "c");
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let catalog = catalog();
        let mut filter = FilterState::default();
        filter.category = Selection::only("nonexistent");
        assert!(compute_visible(&catalog, &filter).is_empty());
    }
}
