//! Filter parameters and page results exchanged with the presentation layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Quote;

/// Filters and page selection for a single query.
///
/// Blank strings count as "no filter". Pages are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

impl FilterParams {
    /// Unfiltered first page.
    pub fn new() -> Self {
        Self {
            page: default_page(),
            ..Self::default()
        }
    }

    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }

    pub fn author(mut self, value: impl Into<String>) -> Self {
        self.author = Some(value.into());
        self
    }

    pub fn tag(mut self, value: impl Into<String>) -> Self {
        self.tag = Some(value.into());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Trim filters, drop blank ones, and lift page 0 to 1.
    pub fn normalized(&self) -> Self {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            search: clean(&self.search),
            author: clean(&self.author),
            tag: clean(&self.tag),
            page: self.page.max(1),
        }
    }
}

/// One page of filtered quotes plus facet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    /// Quotes on the requested page (never more than the page size)
    pub records: Vec<Quote>,

    /// Page that was requested (after normalisation)
    pub current_page: usize,

    /// Always at least 1, even for an empty result
    pub total_pages: usize,

    /// Number of quotes matching the filters across all pages
    pub total_records: usize,

    /// Distinct tags present in the filtered set, sorted ascending
    pub available_tags: BTreeSet<String>,
}
