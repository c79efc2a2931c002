// src/pipeline/query.rs

//! Filtered, paginated views over a corpus snapshot.
//!
//! Filters apply in a fixed order (search, author, tag) and combine with
//! AND. Facets are computed from the filtered set, not the whole corpus.

use std::collections::BTreeSet;

use crate::models::{Corpus, FilterParams, PageResult, Quote};
use crate::utils::contains_ignore_case;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Read-side query over a corpus snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryView {
    page_size: usize,
}

impl Default for QueryView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryView {
    /// A page size of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Filter, paginate and collect facets.
    ///
    /// Pages past the end yield no records but still report `total_pages`.
    pub fn query(&self, corpus: &Corpus, params: &FilterParams) -> PageResult {
        let params = params.normalized();
        let search = params.search.as_deref().map(str::to_lowercase);

        let filtered: Vec<&Quote> = corpus
            .iter()
            .filter(|q| search.as_deref().is_none_or(|s| matches_search(q, s)))
            .filter(|q| params.author.as_deref().is_none_or(|a| q.author == a))
            .filter(|q| {
                params
                    .tag
                    .as_deref()
                    .is_none_or(|t| contains_ignore_case(&q.joined_tags(), t))
            })
            .collect();

        let total_records = filtered.len();
        let total_pages = total_records.div_ceil(self.page_size).max(1);
        let start = (params.page - 1).saturating_mul(self.page_size);

        let records = filtered
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|q| (*q).clone())
            .collect();

        PageResult {
            records,
            current_page: params.page,
            total_pages,
            total_records,
            available_tags: collect_tags(&filtered),
        }
    }
}

/// Query with the default page size.
pub fn query(corpus: &Corpus, params: &FilterParams) -> PageResult {
    QueryView::default().query(corpus, params)
}

/// `needle` must already be lowercase.
fn matches_search(quote: &Quote, needle: &str) -> bool {
    [
        quote.text.as_str(),
        quote.author.as_str(),
        quote.joined_tags().as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn collect_tags(quotes: &[&Quote]) -> BTreeSet<String> {
    quotes
        .iter()
        .flat_map(|q| q.tags.iter())
        .flat_map(|tag| Quote::split_tags(tag))
        .collect()
}
