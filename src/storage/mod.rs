//! Storage abstractions for corpus persistence.
//!
//! The durable artifact is a single CSV file. Readers work from an immutable
//! in-memory snapshot; the single writer replaces the file atomically and
//! then swaps the snapshot pointer.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── config.toml           # Harvester configuration
//! ├── quotes.csv            # Durable corpus (quote,author,tags)
//! └── quotes.tmp            # Transient, only during a replace
//! ```

pub mod local;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Corpus;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for corpus storage backends.
#[async_trait]
pub trait CorpusStorage: Send + Sync {
    /// Latest fully persisted corpus. Empty if nothing was ever stored.
    fn load(&self) -> Arc<Corpus>;

    /// Pick up writes made through other handles to the same durable store
    /// and return the resulting snapshot.
    ///
    /// Backends whose snapshot is always current keep the default.
    async fn refresh(&self) -> Result<Arc<Corpus>> {
        Ok(self.load())
    }

    /// Atomically replace the durable corpus.
    ///
    /// Readers observe either the previous corpus or `corpus` in full.
    /// On error nothing observable changes.
    async fn replace(&self, corpus: Corpus) -> Result<()>;

    /// Existence check by content key.
    fn contains(&self, key: &str) -> bool {
        self.load().contains(key)
    }
}
