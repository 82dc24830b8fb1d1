/// Page-window state over the filtered subset.
///
/// Invariants: `page_size >= 1` and `current_page >= 1`. Fields are private
/// so the constructors and setters can hold them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page_size: u32,
    current_page: u32,
}

impl PaginationState {
    pub const DEFAULT_PAGE_SIZE: u32 = 50;

    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = page.max(1);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Total pages for a visible set of `visible_len` records; never zero.
    pub fn total_pages(&self, visible_len: usize) -> u32 {
        let count = u32::try_from(visible_len).unwrap_or(u32::MAX);
        (count.div_ceil(self.page_size)).max(1)
    }

    /// Self-healing clamp applied when the filtered set shrinks.
    pub fn clamp_to(&mut self, total_pages: u32) {
        if self.current_page > total_pages {
            self.current_page = total_pages.max(1);
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}
