//! This modules defines the common functionality for paging data.

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to display per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The page number, starting from 1.
    pub page: u64,
    /// The maximum number of items on a page.
    pub per_page: u64,
}

impl PageRequest {
    /// Build a page request, falling back to the defaults in `config`.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if `page` or `per_page` is zero.
    pub fn new(
        page: Option<u64>,
        per_page: Option<u64>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let page = page.unwrap_or(config.default_page);
        let per_page = per_page.unwrap_or(config.default_page_size);

        if page == 0 {
            return Err(Error::InvalidArgument {
                name: "page",
                reason: "page numbers start from 1".to_owned(),
            });
        }

        if per_page == 0 {
            return Err(Error::InvalidArgument {
                name: "perPage",
                reason: "perPage must be at least 1".to_owned(),
            });
        }

        Ok(Self { page, per_page })
    }

    /// Build a page request from the raw query string values.
    ///
    /// Missing or empty values fall back to the defaults in `config`.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if a value is not a positive integer.
    pub fn from_query(
        page: Option<&str>,
        per_page: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let page = parse_count("page", page)?;
        let per_page = parse_count("perPage", per_page)?;

        Self::new(page, per_page, config)
    }

    /// The number of items to skip before this page.
    pub fn offset(self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// The maximum number of items to return.
    pub fn limit(self) -> u64 {
        self.per_page
    }
}

fn parse_count(name: &'static str, text: Option<&str>) -> Result<Option<u64>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidArgument {
                name,
                reason: format!("\"{text}\" is not a positive integer"),
            }),
    }
}
