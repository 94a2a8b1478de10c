//! Client-side pagination over an in-memory list

use std::ops::Range;

/// Rows per page on the dashboard
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// A 1-based page cursor over a list of known length
///
/// The pager does not own the list; every operation that depends on the
/// list takes its current length, so the cursor stays valid when rows are
/// removed underneath it.
///
/// # Example
///
/// ```rust
/// use app_state::pagination::Pager;
///
/// let rows = vec!["a", "b", "c", "d", "e", "f", "g"];
/// let mut pager = Pager::new(3);
///
/// assert_eq!(pager.total_pages(rows.len()), 3);
/// assert_eq!(pager.window(&rows), &["a", "b", "c"]);
///
/// pager.go_to(3, rows.len());
/// assert_eq!(pager.window(&rows), &["g"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    /// Create a pager on page 1; a zero page size is treated as 1
    pub fn new(page_size: usize) -> Self {
        Self { page_size: page_size.max(1), current_page: 1 }
    }

    /// Rows per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current page (1-based)
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages for `len` rows (0 when empty)
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// Index range of the current page, clipped to `len`
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    /// Rows on the current page
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    /// Move the cursor into `[1, max(1, total_pages)]`
    pub fn clamp(&mut self, len: usize) {
        let last = self.total_pages(len).max(1);
        self.current_page = self.current_page.clamp(1, last);
    }

    /// Jump to `page`, clamped
    pub fn go_to(&mut self, page: usize, len: usize) {
        self.current_page = page;
        self.clamp(len);
    }

    /// Advance one page if possible, returning whether the page changed
    pub fn next(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page if possible, returning whether the page changed
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Whether a later page exists
    pub fn has_next(&self, len: usize) -> bool {
        self.current_page < self.total_pages(len)
    }

    /// Whether an earlier page exists
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}
