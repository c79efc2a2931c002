//! Deduplicated, insertion-ordered quote collection.

use std::collections::HashSet;

use crate::models::Quote;

/// The full deduplicated collection of harvested quotes.
///
/// Order is discovery order. No two quotes share the same [`Quote::key`];
/// every constructor and mutator keeps the first occurrence of a key.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    quotes: Vec<Quote>,
    keys: HashSet<String>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from a sequence, keeping the first quote per key.
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let mut corpus = Self::new();
        corpus.extend_unique(quotes);
        corpus
    }

    /// Append a quote unless its key is already present.
    ///
    /// Returns `true` if the quote was added.
    pub fn push(&mut self, quote: Quote) -> bool {
        if self.keys.contains(quote.key()) {
            return false;
        }
        self.keys.insert(quote.key().to_string());
        self.quotes.push(quote);
        true
    }

    /// Append every quote whose key is new. Returns the number added.
    pub fn extend_unique(&mut self, quotes: impl IntoIterator<Item = Quote>) -> usize {
        let mut added = 0;
        for quote in quotes {
            if self.push(quote) {
                added += 1;
            }
        }
        added
    }

    /// Existence check by content key.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }
}

impl PartialEq for Corpus {
    fn eq(&self, other: &Self) -> bool {
        self.quotes == other.quotes
    }
}

impl Eq for Corpus {}

impl FromIterator<Quote> for Corpus {
    fn from_iter<I: IntoIterator<Item = Quote>>(iter: I) -> Self {
        Self::from_quotes(iter)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.iter()
    }
}
