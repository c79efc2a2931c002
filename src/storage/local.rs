//! Local filesystem storage implementation.
//!
//! Persists the corpus as CSV with a `quote,author,tags` header and serves
//! reads from an `Arc<Corpus>` snapshot.
//!
//! ## Features
//!
//! - **Atomic replace**: write `<file>.tmp`, flush, rename over the target
//! - **Snapshot reads**: `load()` clones a pointer, never touches the disk
//! - **Fingerprint**: SHA-256 of the durable file for change detection

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Corpus, Quote};
use crate::storage::CorpusStorage;

const HEADER: [&str; 3] = ["quote", "author", "tags"];

/// On-disk row layout.
#[derive(Debug, Serialize, Deserialize)]
struct QuoteRow {
    quote: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    tags: String,
}

impl From<&Quote> for QuoteRow {
    fn from(quote: &Quote) -> Self {
        Self {
            quote: quote.text.clone(),
            author: quote.author.clone(),
            tags: quote.joined_tags(),
        }
    }
}

impl QuoteRow {
    fn into_quote(self) -> Result<Quote> {
        if self.quote.is_empty() {
            return Err(AppError::malformed("row has an empty quote field"));
        }
        Ok(Quote::new(self.quote, self.author, Quote::split_tags(&self.tags)))
    }
}

/// Local filesystem storage backend.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    snapshot: RwLock<Arc<Corpus>>,
}

impl LocalStorage {
    /// Open the corpus file, loading it into memory.
    ///
    /// A missing file yields an empty corpus. An unreadable or corrupt
    /// file is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let corpus = Self::read_corpus(&path).await?;
        log::info!(
            "Opened corpus {} ({} quotes)",
            path.display(),
            corpus.len()
        );

        Ok(Self {
            path,
            snapshot: RwLock::new(Arc::new(corpus)),
        })
    }

    /// Path of the durable corpus file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the durable file and publish it as the current snapshot.
    ///
    /// Used by reader processes whose writer runs elsewhere, and before
    /// every merge so a write from another process is never overwritten.
    pub async fn reload(&self) -> Result<Arc<Corpus>> {
        let corpus = Arc::new(Self::read_corpus(&self.path).await?);
        self.publish(Arc::clone(&corpus));
        Ok(corpus)
    }

    /// SHA-256 hex digest of the durable file, `None` if it doesn't exist.
    pub async fn fingerprint(&self) -> Result<Option<String>> {
        Ok(Self::read_bytes(&self.path)
            .await?
            .map(|bytes| hex::encode(Sha256::digest(&bytes))))
    }

    fn publish(&self, corpus: Arc<Corpus>) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = corpus;
    }

    /// Temp file used while replacing.
    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_corpus(path: &Path) -> Result<Corpus> {
        match Self::read_bytes(path).await? {
            Some(bytes) => decode(&bytes),
            None => {
                log::debug!("No corpus found at {}", path.display());
                Ok(Corpus::new())
            }
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.tmp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CorpusStorage for LocalStorage {
    fn load(&self) -> Arc<Corpus> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    async fn refresh(&self) -> Result<Arc<Corpus>> {
        self.reload().await
    }

    async fn replace(&self, corpus: Corpus) -> Result<()> {
        let bytes = encode(&corpus)?;

        if let Err(error) = self.write_bytes(&bytes).await {
            let _ = tokio::fs::remove_file(self.tmp_path()).await;
            return Err(AppError::persistence(format!(
                "failed to write {}: {}",
                self.path.display(),
                error
            )));
        }

        log::info!(
            "Corpus written: {} quotes to {}",
            corpus.len(),
            self.path.display()
        );
        self.publish(Arc::new(corpus));
        Ok(())
    }
}

/// Serialize a corpus to CSV bytes, header first.
fn encode(corpus: &Corpus) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for quote in corpus {
        writer.serialize(QuoteRow::from(quote))?;
    }

    writer.into_inner().map_err(AppError::persistence)
}

/// Parse CSV bytes into a corpus, skipping rows without a quote.
fn decode(bytes: &[u8]) -> Result<Corpus> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let mut corpus = Corpus::new();
    for (line, row) in reader.deserialize::<QuoteRow>().enumerate() {
        match row?.into_quote() {
            Ok(quote) => {
                if !corpus.push(quote) {
                    log::debug!("Dropping duplicate quote at row {}", line + 1);
                }
            }
            Err(error) => log::warn!("Skipping row {}: {}", line + 1, error),
        }
    }
    Ok(corpus)
}
