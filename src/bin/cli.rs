//! quoteharvest CLI
//!
//! Local entry point for one-off synchronization, the periodic scheduler
//! and corpus queries.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use quoteharvest::{
    error::Result,
    models::{Config, FilterParams, Quote},
    pipeline::{QueryView, Scheduler, Synchronizer},
    services::HttpQuoteSource,
    storage::{CorpusStorage, LocalStorage},
};

/// quoteharvest - Incremental Quote Harvester
#[derive(Parser, Debug)]
#[command(
    name = "quoteharvest",
    version,
    about = "Incremental quote corpus synchronizer"
)]
struct Cli {
    /// Directory containing config.toml and the corpus file
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single synchronization cycle
    Sync {
        /// Override the per-cycle record cap
        #[arg(long)]
        max_records: Option<usize>,
    },

    /// Run the periodic scheduler until Ctrl-C
    Run,

    /// Query the stored corpus
    Query {
        /// Case-insensitive text search over all fields
        #[arg(long, default_value = "")]
        search: String,

        /// Exact author name
        #[arg(long, default_value = "")]
        author: String,

        /// Case-insensitive tag match
        #[arg(long, default_value = "")]
        tag: String,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration files
    Validate,

    /// Show current corpus info
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_synchronizer(config: &Config, storage: Arc<LocalStorage>) -> Result<Synchronizer> {
    let source = HttpQuoteSource::new(config.source.clone())?;
    Ok(Synchronizer::new(Arc::new(source), storage)
        .with_request_delay(config.source.request_delay()))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.storage_dir.join("config.toml");
    let loaded = Config::load(&config_path);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            config_path.display(),
            e
        );
        Config::default()
    });
    let corpus_path = config.storage.corpus_path(&cli.storage_dir);

    match cli.command {
        Command::Sync { max_records } => {
            config.validate()?;
            let storage = Arc::new(LocalStorage::open(&corpus_path).await?);
            let synchronizer = build_synchronizer(&config, storage)?;

            let report = synchronizer
                .sync(max_records.unwrap_or(config.sync.max_records))
                .await?;
            log::info!(
                "Sync complete: {} added, {} already stored, {} scraped over {} page(s), {} total",
                report.added,
                report.known,
                report.scraped,
                report.pages,
                report.total
            );
        }

        Command::Run => {
            config.validate()?;
            let storage = Arc::new(LocalStorage::open(&corpus_path).await?);
            let synchronizer = Arc::new(build_synchronizer(&config, storage)?);
            let scheduler = Scheduler::new(synchronizer, &config.sync);

            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            let stats = scheduler.run_until(shutdown).await;
            log::info!(
                "Scheduler stopped: {} cycle(s), {} failed, {} quote(s) added",
                stats.cycles,
                stats.failures,
                stats.added
            );
        }

        Command::Query {
            search,
            author,
            tag,
            page,
            json,
        } => {
            let storage = LocalStorage::open(&corpus_path).await?;
            let params = FilterParams::new()
                .search(search)
                .author(author)
                .tag(tag)
                .page(page);
            let result = QueryView::new(config.query.page_size).query(&storage.load(), &params);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for quote in &result.records {
                    println!("{}", quote.format("{text}\n    -- {author} [{tags}]"));
                }
                println!(
                    "Page {}/{} ({} matching)",
                    result.current_page, result.total_pages, result.total_records
                );
                if !result.available_tags.is_empty() {
                    let tags: Vec<_> = result.available_tags.iter().cloned().collect();
                    println!("Tags: {}", tags.join(quoteharvest::models::TAG_SEPARATOR));
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            HttpQuoteSource::new(config.source.clone())?;
            log::info!("✓ Config OK (source, selectors, sync, storage, query)");
        }

        Command::Info => {
            let storage = LocalStorage::open(&corpus_path).await?;
            let corpus = storage.load();
            let authors: std::collections::HashSet<&str> =
                corpus.iter().map(|q: &Quote| q.author.as_str()).collect();

            log::info!("Corpus file: {}", storage.path().display());
            match storage.fingerprint().await? {
                Some(digest) => {
                    log::info!("Quotes: {} ({} authors)", corpus.len(), authors.len());
                    log::info!("SHA-256: {}", digest);
                }
                None => log::info!("No corpus written yet."),
            }
        }
    }

    Ok(())
}
