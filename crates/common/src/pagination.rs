//! Page-number arithmetic shared by every listing.
//!
//! The database layer counts a collection, asks [`PageWindow`] which slice
//! to fetch, and wraps the fetched rows into a [`Page`].

use serde::Serialize;

/// Posts per page on every listing.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// The resolved position of one page inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number, always within `1..=num_pages`.
    pub number: u64,
    /// Total number of pages; at least 1 even for an empty collection.
    pub num_pages: u64,
    /// Total number of items in the collection.
    pub count: u64,
    /// Page size.
    pub per_page: u64,
}

impl PageWindow {
    /// Resolve a raw `?page=` value against a collection of `count` items.
    ///
    /// Absent or non-numeric values select the first page. Numbers outside
    /// the valid range clamp to the first or last page.
    #[must_use]
    pub fn new(count: u64, requested: Option<&str>, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = count.div_ceil(per_page).max(1);
        let number = match parse_page_number(requested) {
            n if n < 1 => 1,
            n => (n as u64).min(num_pages),
        };

        Self {
            number,
            num_pages,
            count,
            per_page,
        }
    }

    /// Number of items to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    /// 0-based page index, as sea-orm's paginator counts pages.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.number - 1
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }
}

fn parse_page_number(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };

    match raw.parse::<i64>() {
        Ok(n) => n,
        // Too many digits for i64: past the last page
        Err(_) if raw.bytes().all(|b| b.is_ascii_digit()) => i64::MAX,
        Err(_) => 1,
    }
}

/// One page of a collection together with its navigation facts.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// 1-based number of this page.
    pub number: u64,
    /// Total number of pages, at least 1.
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub count: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
    /// Items on this page.
    pub object_list: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap fetched rows into a page.
    #[must_use]
    pub fn new(window: PageWindow, object_list: Vec<T>) -> Self {
        Self {
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next: window.has_next(),
            has_previous: window.has_previous(),
            object_list,
        }
    }

    /// Transform every item while keeping the navigation facts.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            object_list: self.object_list.into_iter().map(f).collect(),
        }
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_by_default() {
        let window = PageWindow::new(25, None, 10);
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages, 3);
        assert_eq!(window.offset(), 0);
        assert!(window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_non_numeric_selects_first_page() {
        assert_eq!(PageWindow::new(25, Some("abc"), 10).number, 1);
        assert_eq!(PageWindow::new(25, Some(""), 10).number, 1);
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(PageWindow::new(25, Some("0"), 10).number, 1);
        assert_eq!(PageWindow::new(25, Some("-4"), 10).number, 1);
        assert_eq!(PageWindow::new(25, Some("99"), 10).number, 3);
        assert_eq!(
            PageWindow::new(25, Some("99999999999999999999999"), 10).number,
            3
        );
    }

    #[test]
    fn test_last_page_offset() {
        let window = PageWindow::new(25, Some("3"), 10);
        assert_eq!(window.offset(), 20);
        assert_eq!(window.index(), 2);
        assert!(!window.has_next());
        assert!(window.has_previous());
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let window = PageWindow::new(0, Some("5"), 10);
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages, 1);
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        assert_eq!(PageWindow::new(20, None, 10).num_pages, 2);
        assert_eq!(PageWindow::new(21, None, 10).num_pages, 3);
    }

    #[test]
    fn test_page_map_keeps_navigation() {
        let window = PageWindow::new(13, Some("2"), 10);
        let page = Page::new(window, vec![1, 2, 3]).map(|n| n * 10);
        assert_eq!(page.object_list, vec![10, 20, 30]);
        assert_eq!(page.number, 2);
        assert_eq!(page.count, 13);
        assert!(page.has_previous);
        assert!(!page.has_next);
        assert_eq!(page.len(), 3);
    }
}
