//! Delta calculation between the stored corpus and a fresh scrape.
//!
//! Only additions matter: the corpus never shrinks and a known key is
//! never rewritten, so a quote is "new" exactly when its key is absent.

use std::collections::HashSet;

use crate::models::{Corpus, Quote};

/// Quotes from a scrape that the corpus doesn't know yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// New quotes in scrape order, unique among themselves
    pub added: Vec<Quote>,
    /// Scraped quotes already present in the corpus
    pub known: usize,
    /// Scraped quotes repeating an earlier quote of the same scrape
    pub repeated: usize,
}

impl Delta {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Split a scrape into new quotes and ones already accounted for.
///
/// The first occurrence of a key wins when the source repeats itself.
pub fn compute_delta(existing: &Corpus, scraped: Vec<Quote>) -> Delta {
    let mut delta = Delta::default();
    let mut seen: HashSet<String> = HashSet::new();

    for quote in scraped {
        if existing.contains(quote.key()) {
            delta.known += 1;
        } else if seen.insert(quote.key().to_string()) {
            delta.added.push(quote);
        } else {
            delta.repeated += 1;
        }
    }

    delta
}

/// Append `added` after `existing`, keeping the first quote per key.
pub fn merge(existing: &Corpus, added: Vec<Quote>) -> Corpus {
    Corpus::from_quotes(existing.iter().cloned().chain(added))
}
