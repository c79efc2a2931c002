// src/pipeline/schedule.rs

//! Periodic synchronization.
//!
//! Runs a cold-start cycle when the corpus is empty, then one cycle per
//! tick. Cycles never overlap: the loop awaits each one, and ticks missed
//! while a cycle runs are skipped rather than queued.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::models::SyncConfig;
use crate::pipeline::Synchronizer;

/// Counters collected over the scheduler's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    /// Cycles started, including the cold-start one
    pub cycles: usize,
    /// Cycles that ended in an error
    pub failures: usize,
    /// Quotes added across all cycles
    pub added: usize,
}

/// Runs a [`Synchronizer`] on a fixed period.
pub struct Scheduler {
    synchronizer: Arc<Synchronizer>,
    interval: Duration,
    max_records: usize,
}

impl Scheduler {
    pub fn new(synchronizer: Arc<Synchronizer>, config: &SyncConfig) -> Self {
        Self {
            synchronizer,
            interval: config.interval(),
            max_records: config.max_records,
        }
    }

    /// Run until `shutdown` resolves.
    ///
    /// A cycle in progress when shutdown is requested runs to completion.
    pub async fn run_until<F>(&self, shutdown: F) -> ScheduleStats
    where
        F: Future<Output = ()>,
    {
        let mut stats = ScheduleStats::default();
        tokio::pin!(shutdown);

        if self.synchronizer.storage().load().is_empty() {
            log::info!("Corpus is empty, running initial synchronization");
            self.run_cycle(&mut stats).await;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!(
            "Scheduler started: every {}s, up to {} quotes per cycle",
            self.interval.as_secs(),
            self.max_records
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    log::info!(
                        "Scheduler stopping after {} cycle(s), {} failed",
                        stats.cycles,
                        stats.failures
                    );
                    break;
                }
                _ = ticker.tick() => self.run_cycle(&mut stats).await,
            }
        }

        stats
    }

    async fn run_cycle(&self, stats: &mut ScheduleStats) {
        stats.cycles += 1;

        match self.synchronizer.sync(self.max_records).await {
            Ok(report) => {
                stats.added += report.added;
                log::info!(
                    "Cycle {} done: {} added, {} scraped over {} page(s), {} total",
                    stats.cycles,
                    report.added,
                    report.scraped,
                    report.pages,
                    report.total
                );
            }
            Err(error) => {
                stats.failures += 1;
                if error.is_transient() {
                    log::warn!("Cycle {} aborted: {}", stats.cycles, error);
                } else {
                    log::error!("Cycle {} failed: {}", stats.cycles, error);
                }
            }
        }
    }
}
