//! Search request parameters and results.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ArticlePreview;
use crate::error::{AppError, Result};

/// Largest page size accepted by the Content API.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Page size used when the caller does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Date format accepted for `from_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Newest,
    Oldest,
    Relevance,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Newest => "newest",
            OrderBy::Oldest => "oldest",
            OrderBy::Relevance => "relevance",
        }
    }
}

impl FromStr for OrderBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newest" => Ok(OrderBy::Newest),
            "oldest" => Ok(OrderBy::Oldest),
            "relevance" => Ok(OrderBy::Relevance),
            _ => Err(AppError::validation(
                "The order_by must be one of 'newest', 'oldest', 'relevance'.",
            )),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a single article search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Search query, required
    pub term: String,

    /// Results per page (1..=200)
    pub page_size: Option<u32>,

    /// Earliest publication date, `YYYY-MM-DD`
    pub from_date: Option<String>,

    /// Map raw results to previews
    pub filter_response: bool,

    /// One of `newest`, `oldest`, `relevance`
    pub order_by: Option<String>,

    /// Page of results to fetch
    pub page: Option<u32>,
}

impl SearchParams {
    /// Parameters for `term` with the default page size, page 1, filtering on.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            page_size: Some(DEFAULT_PAGE_SIZE),
            from_date: None,
            filter_response: true,
            order_by: None,
            page: Some(1),
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn from_date(mut self, from_date: impl Into<String>) -> Self {
        self.from_date = Some(from_date.into());
        self
    }

    pub fn filter_response(mut self, filter: bool) -> Self {
        self.filter_response = filter;
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Check every parameter, returning the parsed sort order.
    pub fn validate(&self) -> Result<Option<OrderBy>> {
        if self.term.trim().is_empty() {
            return Err(AppError::validation("Search term parameter required."));
        }

        let order_by = self.order_by.as_deref().map(str::parse::<OrderBy>).transpose()?;

        if let Some(size) = self.page_size {
            if size > MAX_PAGE_SIZE {
                return Err(AppError::validation(format!(
                    "Page_size must not exceed {MAX_PAGE_SIZE}."
                )));
            }
            if size == 0 {
                return Err(AppError::validation("Page_size must be at least 1."));
            }
        }

        if let Some(date) = &self.from_date {
            NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
                AppError::validation("The from_date must be in the format YYYY-MM-DD.")
            })?;
        }

        if self.page == Some(0) {
            return Err(AppError::validation("Page must be at least 1."));
        }

        Ok(order_by)
    }

    /// Validate and build the Content API query, without the API key.
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
        let order_by = self.validate()?;

        let mut query = vec![
            ("q", self.term.clone()),
            ("format", "json".to_string()),
            ("show-fields", "all".to_string()),
        ];
        if let Some(size) = self.page_size {
            query.push(("page-size", size.to_string()));
        }
        if let Some(date) = &self.from_date {
            query.push(("from-date", date.clone()));
        }
        if let Some(order) = order_by {
            query.push(("order-by", order.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        Ok(query)
    }
}

/// Results of a search: previews when filtering, raw results otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Previews(Vec<ArticlePreview>),
    Raw(Vec<Value>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Previews(items) => items.len(),
            SearchResults::Raw(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
