//! Quote data structure.

use serde::{Deserialize, Serialize};

/// Separator used when a tag list is flattened into one string.
pub const TAG_SEPARATOR: &str = ", ";

/// A quote scraped from the remote listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    /// Quote body, also the deduplication key
    pub text: String,

    /// Attributed author (empty if the source omitted it)
    pub author: String,

    /// Tags in source order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Quote {
    /// Build a quote. Tags are trimmed, blank ones dropped, and any tag
    /// containing a comma is split, so the stored comma-joined form reads
    /// back to the same list.
    pub fn new(text: impl Into<String>, author: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            tags: tags.iter().flat_map(|t| Self::split_tags(t)).collect(),
        }
    }

    /// Identity key used for deduplication (exact, case-sensitive).
    pub fn key(&self) -> &str {
        &self.text
    }

    /// Tags flattened into a single comma-joined string.
    pub fn joined_tags(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }

    /// Split a comma-joined tag string back into trimmed, non-empty tags.
    pub fn split_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Format quote for display using a template.
    ///
    /// Supported placeholders: `{text}`, `{author}`, `{tags}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{text}", &self.text)
            .replace("{author}", &self.author)
            .replace("{tags}", &self.joined_tags())
    }
}
