//! Fixed-size client-side pagination.

use std::ops::Range;

/// Position of the current page within the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based current page, already clamped.
    pub page: usize,
    /// Total number of pages, at least 1.
    pub total_pages: usize,
    /// Index of the first row on this page.
    pub start: usize,
    /// One past the index of the last row on this page.
    pub end: usize,
    /// Total number of rows.
    pub total: usize,
}

impl PageInfo {
    /// Row range of this page.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns `true` if there is a page after this one.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Returns `true` if there is a page before this one.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Number of pages needed for `len` rows; an empty table still has one page.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

/// Computes the clamped page and its row bounds.
pub fn paginate(len: usize, page_size: usize, page: usize) -> PageInfo {
    let total_pages = total_pages(len, page_size);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * page_size).min(len);
    let end = (start + page_size).min(len);
    PageInfo {
        page,
        total_pages,
        start,
        end,
        total: len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 1);
    }

    #[test]
    fn test_clamps_out_of_range_pages() {
        let info = paginate(25, 10, 9);
        assert_eq!(info.page, 3);
        assert_eq!(info.range(), 20..25);

        let info = paginate(25, 10, 0);
        assert_eq!(info.page, 1);
        assert_eq!(info.range(), 0..10);
    }

    #[test]
    fn test_empty_data() {
        let info = paginate(0, 10, 4);
        assert_eq!(info.page, 1);
        assert_eq!(info.range(), 0..0);
        assert!(!info.has_next());
        assert!(!info.has_prev());
    }
}
