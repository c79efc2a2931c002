//! Service layer for the harvester.
//!
//! - Quote fetching and extraction (`HttpQuoteSource`)

mod quotes;

pub use quotes::{HttpQuoteSource, QuoteSource};
