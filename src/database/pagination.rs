use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Page-number pagination envelope: total count plus next/previous page
/// numbers, absent at the edges.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn from_rows(results: Vec<T>, count: i64, params: &PageParams) -> Self {
        let page = params.page();
        let limit = params.limit();
        let last = if count <= 0 {
            1
        } else {
            (count + limit - 1) / limit
        };

        Self {
            count: count.max(0),
            next: (page < last).then_some(page + 1),
            previous: (page > 1).then_some(page - 1),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: i64, limit: i64) -> PageParams {
        PageParams {
            page: Some(page),
            limit: Some(limit),
        }
    }

    #[test]
    fn first_page_has_no_previous() {
        let page: Page<i32> = Page::from_rows(vec![1, 2], 10, &params(1, 2));
        assert_eq!(page.previous, None);
        assert_eq!(page.next, Some(2));
        assert_eq!(page.count, 10);
    }

    #[test]
    fn last_page_has_no_next() {
        let page: Page<i32> = Page::from_rows(vec![9], 9, &params(5, 2));
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(4));
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page: Page<i32> = Page::from_rows(vec![3, 4], 10, &params(2, 2));
        assert_eq!(page.previous, Some(1));
        assert_eq!(page.next, Some(3));
    }

    #[test]
    fn empty_result_set_has_no_links() {
        let page: Page<i32> = Page::from_rows(vec![], 0, &params(1, 6));
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
        assert_eq!(page.count, 0);
    }

    #[test]
    fn limit_is_clamped() {
        let p = params(1, 100_000);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        let p = params(1, 0);
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn offset_follows_page_number() {
        assert_eq!(params(3, 6).offset(), 12);
        assert_eq!(PageParams::default().offset(), 0);
    }
}
