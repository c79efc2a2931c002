// src/models/selectors.rs

//! CSS selectors for scraping a quote listing page.

use serde::{Deserialize, Serialize};

/// CSS selectors for scraping a quote listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuoteSelectors {
    /// Selector for each quote container on the page
    #[serde(default = "defaults::quote")]
    pub quote: String,

    /// Selector for the quote text within a container
    #[serde(default = "defaults::text")]
    pub text: String,

    /// Selector for the author element within a container
    #[serde(default = "defaults::author")]
    pub author: String,

    /// Selector matching every tag element within a container
    #[serde(default = "defaults::tag")]
    pub tag: String,

    /// Optional selector for a "next page" marker.
    /// When set and missing from a page, that page is treated as the last one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl Default for QuoteSelectors {
    fn default() -> Self {
        Self {
            quote: defaults::quote(),
            text: defaults::text(),
            author: defaults::author(),
            tag: defaults::tag(),
            next: None,
        }
    }
}

mod defaults {
    pub fn quote() -> String {
        "div.quote".into()
    }
    pub fn text() -> String {
        "span.text".into()
    }
    pub fn author() -> String {
        "small.author".into()
    }
    pub fn tag() -> String {
        "a.tag".into()
    }
}
