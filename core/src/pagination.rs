//! Shortlist page position.
//!
//! `page_size` is fixed for the lifetime of the controller; only `page`
//! moves. Transitions are checked against the last server-reported
//! `PageMeta` and rejected before anything is dispatched.

use thiserror::Error;

use probate_types::PageMeta;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("already on the last page")]
    NoNextPage,

    #[error("already on the first page")]
    NoPrevPage,

    #[error("page {requested} is out of range (1..={total_pages})")]
    OutOfRange { requested: u32, total_pages: u32 },

    #[error("no page information yet")]
    NotLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationController {
    page: u32,
    page_size: u32,
}

impl PaginationController {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Back to page 1 after a filter or sort change
    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn next(&mut self, meta: Option<&PageMeta>) -> Result<u32, PageError> {
        let meta = meta.ok_or(PageError::NotLoaded)?;
        if !meta.has_next {
            return Err(PageError::NoNextPage);
        }
        self.page += 1;
        Ok(self.page)
    }

    pub fn prev(&mut self, meta: Option<&PageMeta>) -> Result<u32, PageError> {
        let meta = meta.ok_or(PageError::NotLoaded)?;
        if !meta.has_prev || self.page <= 1 {
            return Err(PageError::NoPrevPage);
        }
        self.page -= 1;
        Ok(self.page)
    }

    /// Jump to `page`, which must lie in `1..=total_pages`
    pub fn goto(&mut self, page: u32, meta: Option<&PageMeta>) -> Result<u32, PageError> {
        let meta = meta.ok_or(PageError::NotLoaded)?;
        if page < 1 || page > meta.total_pages {
            return Err(PageError::OutOfRange {
                requested: page,
                total_pages: meta.total_pages,
            });
        }
        self.page = page;
        Ok(self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(total: u64, page: u32, page_size: u32) -> PageMeta {
        let total_pages = total.div_ceil(u64::from(page_size)) as u32;
        PageMeta {
            total,
            page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    #[test]
    fn test_next_then_last_page_rejects() {
        let mut pager = PaginationController::new(25);
        assert_eq!(pager.next(Some(&meta(40, 1, 25))), Ok(2));
        assert_eq!(pager.next(Some(&meta(40, 2, 25))), Err(PageError::NoNextPage));
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn test_prev_on_first_page_rejects() {
        let mut pager = PaginationController::new(25);
        assert_eq!(pager.prev(Some(&meta(40, 1, 25))), Err(PageError::NoPrevPage));
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn test_goto_bounds() {
        let mut pager = PaginationController::new(10);
        let m = meta(95, 1, 10);

        assert_eq!(pager.goto(10, Some(&m)), Ok(10));
        assert_eq!(
            pager.goto(11, Some(&m)),
            Err(PageError::OutOfRange { requested: 11, total_pages: 10 })
        );
        assert!(pager.goto(0, Some(&m)).is_err());
        assert_eq!(pager.page(), 10);
    }

    #[test]
    fn test_navigation_needs_meta() {
        let mut pager = PaginationController::new(25);
        assert_eq!(pager.next(None), Err(PageError::NotLoaded));
        assert_eq!(pager.goto(1, None), Err(PageError::NotLoaded));
    }

    #[test]
    fn test_reset_keeps_page_size() {
        let mut pager = PaginationController::new(25);
        pager.goto(3, Some(&meta(100, 1, 25))).unwrap();
        pager.reset();
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.page_size(), 25);
    }
}
