//! This modules defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Resolve the requested page and page size, applying defaults and limits.
    ///
    /// Pages start at 1 and the page size is clamped to `1..=max_page_size`.
    pub fn resolve(&self, page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
        let page = page.unwrap_or(self.default_page).max(1);
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1));

        (page, limit)
    }
}

/// Describes where a page sits within the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(limit.max(1));

        Self {
            page,
            limit,
            total_count,
            total_pages,
            has_more: page < total_pages,
        }
    }

    /// The number of rows to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use crate::pagination::{Pagination, PaginationConfig};

    #[test]
    fn uses_defaults() {
        let config = PaginationConfig::default();

        assert_eq!(config.resolve(None, None), (1, 10));
    }

    #[test]
    fn clamps_page_size() {
        let config = PaginationConfig::default();

        assert_eq!(config.resolve(Some(2), Some(0)), (2, 1));
        assert_eq!(config.resolve(Some(2), Some(500)), (2, 100));
    }

    #[test]
    fn page_zero_becomes_first_page() {
        let config = PaginationConfig::default();

        assert_eq!(config.resolve(Some(0), None), (1, 10));
    }

    #[test]
    fn counts_partial_last_page() {
        let pagination = Pagination::new(1, 10, 21);

        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_more);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn last_page_has_no_more() {
        let pagination = Pagination::new(3, 10, 21);

        assert!(!pagination.has_more);
        assert_eq!(pagination.offset(), 20);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let pagination = Pagination::new(1, 10, 0);

        assert_eq!(pagination.total_pages, 0);
        assert!(!pagination.has_more);
    }
}
