//! Domain models

pub mod book;
pub mod borrow;
pub mod rating;
pub mod user;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Offset-based pagination parameters
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Page number, 1-based (default: 1)
    pub page: Option<i64>,
    /// Records per page (default: 10)
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(10).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

/// Pagination envelope returned by history and report queries
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> PageResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(query: &PageQuery, total: i64, data: Vec<T>) -> Self {
        Self {
            page: query.page(),
            page_size: query.page_size(),
            total,
            total_pages: total_pages(total, query.page_size()),
            data,
        }
    }
}

/// `ceil(total / page_size)`; zero records means zero pages.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 5), 5);
        assert_eq!(total_pages(26, 5), 6);
    }

    #[test]
    fn page_query_defaults_and_offset() {
        let q = PageQuery {
            page: None,
            page_size: None,
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 10);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            page: Some(3),
            page_size: Some(5),
        };
        assert_eq!(q.offset(), 10);

        // Nonsense input is clamped rather than rejected
        let q = PageQuery {
            page: Some(0),
            page_size: Some(0),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 1);
    }
}
