//! Page slicing for result lists.

/// Results shown per page when no size is given.
pub const DEFAULT_PER_PAGE: usize = 50;

/// One page of a result list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number as requested.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<'a, T> Page<'a, T> {
    /// Slices `items` for page `page` (1-based). Page numbers below one are
    /// treated as one; pages past the end are empty.
    pub fn of(items: &'a [T], page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let start = (page - 1).saturating_mul(per_page).min(items.len());
        let end = start.saturating_add(per_page).min(items.len());
        Self {
            items: &items[start..end],
            page,
            per_page,
            total_items: items.len(),
            total_pages: items.len().div_ceil(per_page),
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first item on this page within the full list.
    pub fn first_position(&self) -> usize {
        (self.page - 1) * self.per_page + 1
    }
}
