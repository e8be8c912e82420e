//! Search/scrape boundary: result types and the client trait.

mod firecrawl;
pub mod mock;

pub use firecrawl::FirecrawlClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One result from a search call. Content fields are populated only when the
/// search was issued with scraping enabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

/// One scraped page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapedPage {
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Errors from the search/scrape boundary. These never propagate past the
/// tool executor: every one degrades to an explanatory text outcome.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Search/scrape API error: {0}")]
    Api(String),

    #[error("Failed to reach search/scrape API: {0}")]
    Network(#[from] reqwest::Error),
}

/// Client for the search/scrape boundary.
///
/// The upstream search interface only supports an all-or-nothing scrape flag
/// per call; callers wanting scraped content for a subset of results must
/// issue a second search and filter it themselves.
#[async_trait]
pub trait WebClient: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        scrape: bool,
        time_range: Option<&str>,
    ) -> Result<Vec<SearchHit>, ScrapeError>;

    async fn scrape(&self, url: &str, formats: &[String]) -> Result<ScrapedPage, ScrapeError>;
}
