// src/services/quotes.rs

//! Quote source service.
//!
//! Fetches one listing page at a time and extracts quotes using the
//! configured CSS selectors.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Quote, QuoteSelectors, SourceConfig, SourcePage};
use crate::utils::http;

/// A paginated source of quotes.
///
/// Pages are 1-based. A page without any extractable record ends the
/// listing and is reported as `has_more == false`, never as an error.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch a single page.
    ///
    /// Fails with [`AppError::SourceUnavailable`] on transport errors or a
    /// non-success status.
    async fn fetch_page(&self, page: u32) -> Result<SourcePage>;
}

/// Compiled form of [`QuoteSelectors`].
#[derive(Debug)]
struct CompiledSelectors {
    quote: Selector,
    text: Selector,
    author: Selector,
    tag: Selector,
    next: Option<Selector>,
}

impl CompiledSelectors {
    fn compile(selectors: &QuoteSelectors) -> Result<Self> {
        Ok(Self {
            quote: parse_selector(&selectors.quote)?,
            text: parse_selector(&selectors.text)?,
            author: parse_selector(&selectors.author)?,
            tag: parse_selector(&selectors.tag)?,
            next: selectors.next.as_deref().map(parse_selector).transpose()?,
        })
    }
}

/// HTTP-backed quote source for an HTML listing.
pub struct HttpQuoteSource {
    config: SourceConfig,
    client: Client,
    selectors: CompiledSelectors,
}

impl HttpQuoteSource {
    /// Create a source with its own HTTP client.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = http::create_client(&config)?;
        Self::with_client(config, client)
    }

    /// Create a source sharing an existing HTTP client.
    pub fn with_client(config: SourceConfig, client: Client) -> Result<Self> {
        let selectors = CompiledSelectors::compile(&config.selectors)?;
        Ok(Self {
            config,
            client,
            selectors,
        })
    }

    /// Extract all quotes from a listing document.
    fn parse_page(&self, html: &str) -> SourcePage {
        let document = Html::parse_document(html);

        let quotes: Vec<Quote> = document
            .select(&self.selectors.quote)
            .filter_map(|container| match self.parse_quote(&container) {
                Ok(quote) => Some(quote),
                Err(error) => {
                    log::debug!("Skipping record: {}", error);
                    None
                }
            })
            .collect();

        let has_more = match &self.selectors.next {
            _ if quotes.is_empty() => false,
            Some(next) => document.select(next).next().is_some(),
            None => true,
        };

        SourcePage { quotes, has_more }
    }

    fn parse_quote(&self, container: &ElementRef) -> Result<Quote> {
        let text = container
            .select(&self.selectors.text)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::malformed("quote container has no text"))?;

        let author = container
            .select(&self.selectors.author)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let tags = container
            .select(&self.selectors.tag)
            .map(element_text)
            .collect();

        Ok(Quote::new(text, author, tags))
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch_page(&self, page: u32) -> Result<SourcePage> {
        let url = self.config.page_for(page);
        log::debug!("Fetching page {} ({})", page, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::source_unavailable(page, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::source_unavailable(page, format!("HTTP {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::source_unavailable(page, e))?;

        Ok(self.parse_page(&html))
    }
}

/// Concatenated text of all descendant nodes, each trimmed at both ends.
fn element_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
