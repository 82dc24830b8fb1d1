//! Page navigation over the visible list, with self-healing clamping.

use vitrine_model::{PaginationState, ThemeRecord};

/// One rendered page of the visible list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub items: Vec<&'a ThemeRecord>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Wraps `PaginationState` with navigation that can never leave the valid
/// page range. Navigation past a boundary is a no-op, not an error.
#[derive(Debug, Clone)]
pub struct PaginationController {
    state: PaginationState,
}

impl PaginationController {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: PaginationState::new(page_size),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page()
    }

    pub fn page_size(&self) -> u32 {
        self.state.page_size()
    }

    /// Back to page 1, after any filter change.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn total_pages(&self, visible_len: usize) -> u32 {
        self.state.total_pages(visible_len)
    }

    /// Clamp into range and slice out the current page. Shrinking the visible
    /// list between calls self-heals here rather than erroring.
    pub fn page<'a>(&mut self, visible: &[&'a ThemeRecord]) -> PageView<'a> {
        let total_pages = self.state.total_pages(visible.len());
        self.state.clamp_to(total_pages);

        let current_page = self.state.current_page();
        let page_size = self.state.page_size() as usize;
        let start = (current_page as usize - 1) * page_size;
        let items = visible.iter().skip(start).take(page_size).copied().collect();

        PageView {
            items,
            current_page,
            total_pages,
        }
    }

    pub fn first_page(&mut self) {
        self.state.set_current_page(1);
    }

    pub fn prev_page(&mut self) {
        self.state
            .set_current_page(self.state.current_page().saturating_sub(1));
    }

    pub fn next_page(&mut self, visible_len: usize) {
        let total = self.state.total_pages(visible_len);
        if self.state.current_page() < total {
            self.state.set_current_page(self.state.current_page() + 1);
        }
    }

    pub fn last_page(&mut self, visible_len: usize) {
        self.state.set_current_page(self.state.total_pages(visible_len));
    }

    pub fn go_to(&mut self, page: u32, visible_len: usize) {
        let total = self.state.total_pages(visible_len);
        self.state.set_current_page(page.min(total));
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(PaginationState::DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::builders::theme;
    use vitrine_model::ThemeRecord;

    fn themes(n: usize) -> Vec<ThemeRecord> {
        (0..n)
            .map(|i| {
                theme(
                    &format!("t{i}"),
                    &format!("Theme {i}"),
                    "dark",
                    "minimal",
                    i as i64,
                )
            })
            .collect()
    }

    #[test]
    fn slices_the_requested_page() {
        let all = themes(7);
        let refs: Vec<&ThemeRecord> = all.iter().collect();
        let mut pager = PaginationController::new(3);

        pager.next_page(refs.len());
        let view = pager.page(&refs);

        assert_eq!(view.current_page, 2);
        assert_eq!(view.total_pages, 3);
        let ids: Vec<&str> = view.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t4", "t5"]);
    }

    #[test]
    fn boundary_navigation_is_a_no_op() {
        let all = themes(4);
        let refs: Vec<&ThemeRecord> = all.iter().collect();
        let mut pager = PaginationController::new(3);

        pager.prev_page();
        assert_eq!(pager.current_page(), 1);

        pager.last_page(refs.len());
        assert_eq!(pager.current_page(), 2);
        pager.next_page(refs.len());
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn shrinking_visible_list_clamps_current_page() {
        let all = themes(9);
        let refs: Vec<&ThemeRecord> = all.iter().collect();
        let mut pager = PaginationController::new(3);
        pager.last_page(refs.len());
        assert_eq!(pager.current_page(), 3);

        let fewer: Vec<&ThemeRecord> = all.iter().take(2).collect();
        let view = pager.page(&fewer);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn empty_visible_list_is_one_empty_page() {
        let mut pager = PaginationController::new(3);
        let view = pager.page(&[]);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 1);
        assert!(view.items.is_empty());
    }

    #[test]
    fn paging_is_idempotent_for_a_stable_list() {
        let all = themes(5);
        let refs: Vec<&ThemeRecord> = all.iter().collect();
        let mut pager = PaginationController::new(2);
        pager.go_to(2, refs.len());

        let first = pager.page(&refs);
        let second = pager.page(&refs);
        assert_eq!(first, second);
    }
}
