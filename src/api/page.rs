use std::collections::HashMap;

use serde::Serialize;

use crate::error::ApiError;

const PAGE_KEY: &str = "page";
const ROWS_KEY: &str = "rows";

/// Requested page of a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub rows_per_page: u32,
}

impl Page {
    /// Parse `page` and `rows` from the query string.
    pub fn parse(params: &HashMap<String, String>, default_rows: u32, max_rows: u32) -> Result<Page, ApiError> {
        let number = match params.get(PAGE_KEY).filter(|v| !v.is_empty()) {
            None => 1,
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| ApiError::field_error(PAGE_KEY, e.to_string()))?,
        };

        let rows_per_page = match params.get(ROWS_KEY).filter(|v| !v.is_empty()) {
            None => default_rows,
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| ApiError::field_error(ROWS_KEY, e.to_string()))?,
        };

        if number == 0 {
            return Err(ApiError::field_error(PAGE_KEY, "page value too small, must be larger than 0"));
        }
        if rows_per_page == 0 {
            return Err(ApiError::field_error(ROWS_KEY, "rows value too small, must be larger than 0"));
        }
        if rows_per_page > max_rows {
            return Err(ApiError::field_error(
                ROWS_KEY,
                format!("rows value too large, must be less than {}", max_rows),
            ));
        }

        Ok(Page { number, rows_per_page })
    }
}

/// One page of items plus the total row count for the filter
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub rows_per_page: u32,
}

impl<T: Serialize> PageDocument<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.number,
            rows_per_page: page.rows_per_page,
        }
    }
}
