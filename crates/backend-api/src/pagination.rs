//! Page-number pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

use crate::ApiError;

const MAX_PAGE_SIZE: u32 = 100;

/// `?page=` and `?page_size=` as they arrive; both 1-based and optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Resolved window ready for a LIMIT/OFFSET query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageQuery {
    pub fn resolve(&self, default_page_size: i64) -> Result<Page, ApiError> {
        let page = match self.page {
            None => 1,
            Some(0) => return Err(ApiError::bad_request("page numbers start at 1")),
            Some(page) => page,
        };

        let limit = match self.page_size {
            None => default_page_size,
            Some(0) => return Err(ApiError::bad_request("page_size must be positive")),
            Some(size) => i64::from(size.min(MAX_PAGE_SIZE)),
        };

        Ok(Page {
            limit,
            offset: i64::from(page - 1) * limit,
        })
    }
}

/// List envelope: total row count plus the requested window.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let page = PageQuery::default().resolve(10).unwrap();
        assert_eq!(page, Page { limit: 10, offset: 0 });
    }

    #[test]
    fn later_pages_advance_the_offset() {
        let query = PageQuery {
            page: Some(3),
            page_size: Some(5),
        };
        assert_eq!(query.resolve(10).unwrap(), Page { limit: 5, offset: 10 });
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(PageQuery {
            page: Some(0),
            page_size: None
        }
        .resolve(10)
        .is_err());
        assert!(PageQuery {
            page: None,
            page_size: Some(0)
        }
        .resolve(10)
        .is_err());
    }

    #[test]
    fn page_size_is_capped() {
        let query = PageQuery {
            page: None,
            page_size: Some(100_000),
        };
        assert_eq!(query.resolve(10).unwrap().limit, i64::from(MAX_PAGE_SIZE));
    }
}
