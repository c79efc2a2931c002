//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::QuoteSelectors;

/// Placeholder replaced by the 1-based page number in `source.page_url`.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote listing and HTTP behavior settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Synchronization cycle settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Durable corpus location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Read-side settings
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if !self.source.page_url.contains(PAGE_PLACEHOLDER) {
            return Err(AppError::validation(format!(
                "source.page_url must contain {PAGE_PLACEHOLDER}"
            )));
        }
        url::Url::parse(&self.source.page_for(1))?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.sync.max_records == 0 {
            return Err(AppError::validation("sync.max_records must be > 0"));
        }
        if self.sync.interval_secs == 0 {
            return Err(AppError::validation("sync.interval_secs must be > 0"));
        }
        if self.storage.corpus_file.as_os_str().is_empty() {
            return Err(AppError::validation("storage.corpus_file is empty"));
        }
        if self.query.page_size == 0 {
            return Err(AppError::validation("query.page_size must be > 0"));
        }
        Ok(())
    }
}

/// Remote listing and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page URL template containing `{page}`
    #[serde(default = "defaults::page_url")]
    pub page_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Extraction selectors
    #[serde(default)]
    pub selectors: QuoteSelectors,
}

impl SourceConfig {
    /// Concrete URL for a 1-based page number.
    pub fn page_for(&self, page: u32) -> String {
        self.page_url.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_url: defaults::page_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            selectors: QuoteSelectors::default(),
        }
    }
}

/// Synchronization cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Hard cap on records scraped per cycle
    #[serde(default = "defaults::max_records")]
    pub max_records: usize,

    /// Seconds between scheduled cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_records: defaults::max_records(),
            interval_secs: defaults::interval(),
        }
    }
}

/// Durable storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// CSV file holding the corpus. Relative paths resolve against the
    /// directory of the configuration file.
    #[serde(default = "defaults::corpus_file")]
    pub corpus_file: PathBuf,
}

impl StorageConfig {
    /// Resolve the corpus path against a base directory.
    pub fn corpus_path(&self, base: &Path) -> PathBuf {
        if self.corpus_file.is_absolute() {
            self.corpus_file.clone()
        } else {
            base.join(&self.corpus_file)
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            corpus_file: defaults::corpus_file(),
        }
    }
}

/// Read-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn page_url() -> String {
        "http://quotes.toscrape.com/page/{page}/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; quoteharvest/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }

    // Sync defaults
    pub fn max_records() -> usize {
        1000
    }
    pub fn interval() -> u64 {
        3 * 60 * 60
    }

    pub fn corpus_file() -> PathBuf {
        PathBuf::from("quotes.csv")
    }

    pub fn page_size() -> usize {
        10
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
