// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod corpus;
mod query;
mod quote;
mod selectors;

// Re-export all public types
pub use config::{
    Config, LoggingConfig, PAGE_PLACEHOLDER, QueryConfig, SourceConfig, StorageConfig, SyncConfig,
};
pub use corpus::Corpus;
pub use query::{FilterParams, PageResult};
pub use quote::{Quote, TAG_SEPARATOR};
pub use selectors::QuoteSelectors;

/// One page of records returned by a quote source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePage {
    /// Records in page order
    pub quotes: Vec<Quote>,
    /// `false` once the source has no further pages
    pub has_more: bool,
}

impl SourcePage {
    /// Terminal page with no records.
    pub fn end() -> Self {
        Self::default()
    }
}
