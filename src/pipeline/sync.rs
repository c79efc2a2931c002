// src/pipeline/sync.rs

//! Corpus synchronization cycle.
//!
//! One cycle scrapes the source page by page, keeps the quotes whose key
//! is new, and persists `existing ++ new` through a single atomic replace.
//! A cycle that finds nothing new never touches the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::Quote;
use crate::pipeline::diff::{compute_delta, merge};
use crate::services::QuoteSource;
use crate::storage::CorpusStorage;

/// Outcome of a completed synchronization cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Quotes appended to the corpus
    pub added: usize,
    /// Quotes scraped this cycle (after the cap)
    pub scraped: usize,
    /// Scraped quotes that were already stored
    pub known: usize,
    /// Pages requested from the source
    pub pages: u32,
    /// Corpus size after the cycle
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn has_changes(&self) -> bool {
        self.added > 0
    }
}

/// Drives a [`QuoteSource`] and merges its output into a [`CorpusStorage`].
pub struct Synchronizer {
    source: Arc<dyn QuoteSource>,
    storage: Arc<dyn CorpusStorage>,
    request_delay: Duration,
    running: Mutex<()>,
}

impl Synchronizer {
    pub fn new(source: Arc<dyn QuoteSource>, storage: Arc<dyn CorpusStorage>) -> Self {
        Self {
            source,
            storage,
            request_delay: Duration::ZERO,
            running: Mutex::new(()),
        }
    }

    /// Pause between consecutive page requests.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn storage(&self) -> &Arc<dyn CorpusStorage> {
        &self.storage
    }

    /// Run one cycle, scraping at most `max_records` quotes.
    ///
    /// Fails fast with [`AppError::SyncInProgress`] if another cycle is
    /// running. The stored corpus is re-read before scraping so the merge
    /// starts from the latest durable state. A source failure aborts the
    /// cycle before any write.
    pub async fn sync(&self, max_records: usize) -> Result<SyncReport> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| AppError::SyncInProgress)?;

        let started_at = Utc::now();
        let existing = self.storage.refresh().await?;
        log::info!(
            "Synchronization started ({} quotes stored, cap {})",
            existing.len(),
            max_records
        );

        let (scraped, pages) = self.scrape(max_records).await?;
        let scraped_count = scraped.len();
        let delta = compute_delta(&existing, scraped);

        log::debug!(
            "Scraped {} quote(s): {} new, {} already stored, {} repeated",
            scraped_count,
            delta.added.len(),
            delta.known,
            delta.repeated
        );
        let known = delta.known;

        let total = if delta.has_changes() {
            let added = delta.added.len();
            let merged = merge(&existing, delta.added);
            let total = merged.len();
            self.storage.replace(merged).await?;
            log::info!("Found {} new quote(s), corpus now {}", added, total);
            total
        } else {
            log::info!("No new quotes found");
            existing.len()
        };

        Ok(SyncReport {
            added: total - existing.len(),
            scraped: scraped_count,
            known,
            pages,
            total,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Fetch pages from 1 until the source ends or the cap is reached.
    async fn scrape(&self, max_records: usize) -> Result<(Vec<Quote>, u32)> {
        let mut quotes = Vec::new();
        let mut pages = 0;

        while quotes.len() < max_records {
            if pages > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let page = pages + 1;
            let batch = self.source.fetch_page(page).await?;
            pages = page;

            let remaining = max_records - quotes.len();
            log::debug!("Page {}: {} quote(s)", page, batch.quotes.len());
            quotes.extend(batch.quotes.into_iter().take(remaining));

            if !batch.has_more {
                break;
            }
        }

        Ok((quotes, pages))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::models::{Corpus, SourcePage};
    use crate::storage::LocalStorage;

    /// In-memory paginated source.
    pub(crate) struct FakeSource {
        pages: StdMutex<Vec<Vec<Quote>>>,
        fail_on: StdMutex<Option<u32>>,
        pub(crate) calls: AtomicU32,
    }

    impl FakeSource {
        pub(crate) fn new(pages: Vec<Vec<Quote>>) -> Self {
            Self {
                pages: StdMutex::new(pages),
                fail_on: StdMutex::new(None),
                calls: AtomicU32::new(0),
            }
        }

        pub(crate) fn fail_on(self, page: u32) -> Self {
            *self.fail_on.lock().unwrap() = Some(page);
            self
        }

        pub(crate) fn heal(&self) {
            *self.fail_on.lock().unwrap() = None;
        }

        pub(crate) fn set_pages(&self, pages: Vec<Vec<Quote>>) {
            *self.pages.lock().unwrap() = pages;
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn fetch_page(&self, page: u32) -> Result<SourcePage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail_on.lock().unwrap() == Some(page) {
                return Err(AppError::source_unavailable(page, "HTTP 503 Service Unavailable"));
            }
            let pages = self.pages.lock().unwrap();
            match pages.get(page as usize - 1) {
                Some(quotes) if !quotes.is_empty() => Ok(SourcePage {
                    quotes: quotes.clone(),
                    has_more: true,
                }),
                _ => Ok(SourcePage::end()),
            }
        }
    }

    pub(crate) fn quotes(prefix: &str, range: std::ops::Range<usize>) -> Vec<Quote> {
        range
            .map(|i| Quote::new(format!("{prefix}{i}"), "author", vec!["tag".into()]))
            .collect()
    }

    async fn setup(source: FakeSource) -> (TempDir, Arc<FakeSource>, Arc<LocalStorage>, Synchronizer) {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(
            LocalStorage::open(tmp.path().join("quotes.csv"))
                .await
                .unwrap(),
        );
        let source = Arc::new(source);
        let sync = Synchronizer::new(source.clone(), storage.clone());
        (tmp, source, storage, sync)
    }

    #[tokio::test]
    async fn test_cold_sync_stores_everything_in_order() {
        let (_tmp, source, storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..10), quotes("a", 10..15)])).await;

        let report = sync.sync(1000).await.unwrap();

        assert_eq!(report.added, 15);
        assert_eq!(report.pages, 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        let corpus = storage.load();
        assert_eq!(corpus.quotes()[0].text, "a0");
        assert_eq!(corpus.quotes()[14].text, "a14");
    }

    #[tokio::test]
    async fn test_second_sync_is_idempotent() {
        let (_tmp, _source, storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..10), quotes("a", 10..20)])).await;

        sync.sync(1000).await.unwrap();
        let before = storage.fingerprint().await.unwrap();
        let modified = std::fs::metadata(storage.path()).unwrap().modified().unwrap();

        let report = sync.sync(1000).await.unwrap();

        assert_eq!(report.added, 0);
        assert_eq!(report.known, 20);
        assert!(!report.has_changes());
        assert_eq!(storage.fingerprint().await.unwrap(), before);
        assert_eq!(
            std::fs::metadata(storage.path()).unwrap().modified().unwrap(),
            modified
        );
    }

    #[tokio::test]
    async fn test_new_quotes_are_appended() {
        let (_tmp, source, storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..5)])).await;
        sync.sync(1000).await.unwrap();

        // New quote shows up at the top of the listing.
        let mut page = quotes("b", 0..1);
        page.extend(quotes("a", 0..5));
        source.set_pages(vec![page]);

        let report = sync.sync(1000).await.unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.known, 5);
        assert_eq!(report.total, 6);

        let corpus = storage.load();
        let texts: Vec<_> = corpus.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["a0", "a1", "a2", "a3", "a4", "b0"]);
    }

    #[tokio::test]
    async fn test_cap_limits_scrape() {
        let (_tmp, source, storage, sync) = setup(FakeSource::new(vec![
            quotes("a", 0..10),
            quotes("a", 10..20),
            quotes("a", 20..30),
        ]))
        .await;

        let report = sync.sync(15).await.unwrap();

        assert_eq!(report.scraped, 15);
        assert_eq!(report.pages, 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(storage.load().len(), 15);
    }

    #[tokio::test]
    async fn test_source_failure_aborts_without_write() {
        let (_tmp, _source, storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..10), quotes("a", 10..20)])).await;
        sync.sync(1000).await.unwrap();
        let before = storage.fingerprint().await.unwrap();

        // First page succeeds with new quotes, second page fails.
        let source_failing = FakeSource::new(vec![quotes("b", 0..10)]).fail_on(2);
        let failing = Synchronizer::new(Arc::new(source_failing), storage.clone());

        let result = failing.sync(1000).await;
        assert!(matches!(
            result,
            Err(AppError::SourceUnavailable { page: 2, .. })
        ));
        assert_eq!(storage.load().len(), 20);
        assert_eq!(storage.fingerprint().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_repeated_quotes_across_pages_stored_once() {
        let (_tmp, _source, storage, sync) = setup(FakeSource::new(vec![
            quotes("a", 0..10),
            quotes("a", 5..15),
        ]))
        .await;

        let report = sync.sync(1000).await.unwrap();

        assert_eq!(report.scraped, 20);
        assert_eq!(report.added, 15);
        assert_eq!(storage.load().len(), 15);
    }

    #[tokio::test]
    async fn test_growth_is_monotonic() {
        let (_tmp, source, storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..10)])).await;

        let mut last = 0;
        for round in 0..4 {
            let mut page = quotes("a", 0..10);
            page.extend(quotes(&format!("r{round}-"), 0..round));
            source.set_pages(vec![page]);

            sync.sync(1000).await.unwrap();
            let corpus = storage.load();
            assert!(corpus.len() >= last);
            let keys: std::collections::HashSet<_> = corpus.iter().map(|q| q.key()).collect();
            assert_eq!(keys.len(), corpus.len());
            last = corpus.len();
        }
        assert_eq!(last, 10 + 1 + 2 + 3);
    }

    #[tokio::test]
    async fn test_sync_merges_onto_writes_from_another_handle() {
        let (_tmp, source, storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..3)])).await;
        sync.sync(1000).await.unwrap();

        // Another process adds quotes the source no longer lists.
        let other = LocalStorage::open(storage.path()).await.unwrap();
        let mut written = other.load().quotes().to_vec();
        written.extend(quotes("b", 0..2));
        other.replace(Corpus::from_quotes(written)).await.unwrap();

        let mut page = quotes("a", 0..3);
        page.extend(quotes("c", 0..1));
        source.set_pages(vec![page]);

        let report = sync.sync(1000).await.unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.total, 6);

        let reopened = LocalStorage::open(storage.path()).await.unwrap();
        let texts: Vec<_> = reopened.load().iter().map(|q| q.text.clone()).collect();
        assert_eq!(texts, vec!["a0", "a1", "a2", "b0", "b1", "c0"]);
        assert_eq!(*storage.load(), *reopened.load());
    }

    #[tokio::test]
    async fn test_overlapping_sync_rejected() {
        let (_tmp, _source, _storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..3)])).await;

        let _held = sync.running.try_lock().unwrap();
        assert!(matches!(sync.sync(10).await, Err(AppError::SyncInProgress)));
    }

    #[tokio::test]
    async fn test_heal_after_failure() {
        let (_tmp, source, storage, sync) =
            setup(FakeSource::new(vec![quotes("a", 0..3)]).fail_on(1)).await;

        assert!(sync.sync(100).await.is_err());
        assert!(storage.load().is_empty());

        source.heal();
        assert_eq!(sync.sync(100).await.unwrap().added, 3);
        assert_eq!(*storage.load(), Corpus::from_quotes(quotes("a", 0..3)));
    }
}
