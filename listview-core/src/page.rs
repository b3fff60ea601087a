//! Pagination — slicing the sorted view into display windows.

use serde::{Deserialize, Serialize};

/// Requested page (0-based) and page size. `per_page == 0` disables windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// No windowing: a single page holding every row.
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Resolved window over a row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Effective page after clamping.
    pub page: usize,
    pub per_page: usize,
    /// Always at least 1, even for an empty view.
    pub page_count: usize,
    pub total: usize,
    /// Row range `[start, end)` into the sorted view.
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    /// Resolve `pagination` against `total` rows. Out-of-range pages clamp to
    /// the last page.
    pub fn resolve(pagination: Pagination, total: usize) -> Self {
        if pagination.per_page == 0 {
            return Self {
                page: 0,
                per_page: total,
                page_count: 1,
                total,
                start: 0,
                end: total,
            };
        }
        let per_page = pagination.per_page;
        let page_count = total.div_ceil(per_page).max(1);
        let page = pagination.page.min(page_count - 1);
        let start = (page * per_page).min(total);
        let end = (start + per_page).min(total);
        Self {
            page,
            per_page,
            page_count,
            total,
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }
}

/// Slice `rows` to the requested page.
pub fn window<T>(rows: &[T], pagination: Pagination) -> (&[T], PageWindow) {
    let w = PageWindow::resolve(pagination, rows.len());
    (&rows[w.start..w.end], w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_is_single_page() {
        let rows = [1, 2, 3];
        let (slice, w) = window(&rows, Pagination::unbounded());
        assert_eq!(slice, &[1, 2, 3]);
        assert_eq!(w.page_count, 1);
        assert!(!w.has_next());
    }

    #[test]
    fn pages_split_rows() {
        let rows: Vec<u32> = (0..7).collect();
        let (slice, w) = window(&rows, Pagination::new(1, 3));
        assert_eq!(slice, &[3, 4, 5]);
        assert_eq!(w.page_count, 3);
        assert!(w.has_next());
        assert!(w.has_prev());

        let (last, w) = window(&rows, Pagination::new(2, 3));
        assert_eq!(last, &[6]);
        assert!(!w.has_next());
    }

    #[test]
    fn page_past_end_clamps_to_last() {
        let rows: Vec<u32> = (0..7).collect();
        let (slice, w) = window(&rows, Pagination::new(99, 3));
        assert_eq!(w.page, 2);
        assert_eq!(slice, &[6]);
    }

    #[test]
    fn empty_total_is_one_empty_page() {
        let rows: Vec<u32> = Vec::new();
        let (slice, w) = window(&rows, Pagination::new(3, 10));
        assert!(slice.is_empty());
        assert!(w.is_empty());
        assert_eq!(w.page_count, 1);
        assert_eq!(w.page, 0);
    }
}
