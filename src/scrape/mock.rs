//! Canned-fixture web client for tests.
//!
//! Serves a fixed hit list and page map, and counts upstream calls so tests
//! can assert the one-call/two-call properties of the tools.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ScrapeError, ScrapedPage, SearchHit, WebClient};

#[derive(Default)]
pub struct MockWebClient {
    hits: Vec<SearchHit>,
    pages: HashMap<String, ScrapedPage>,
    failing_urls: HashSet<String>,
    fail_search: bool,
    search_calls: AtomicUsize,
    scrape_calls: AtomicUsize,
}

impl MockWebClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixture hits returned by every search, in order. Content fields are
    /// stripped on metadata-only searches.
    pub fn with_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.hits = hits;
        self
    }

    /// Fixture page served for a URL by `scrape`.
    pub fn with_page(mut self, url: impl Into<String>, page: ScrapedPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Make `scrape` fail for this URL.
    pub fn with_failing_url(mut self, url: impl Into<String>) -> Self {
        self.failing_urls.insert(url.into());
        self
    }

    /// Make every search call fail.
    pub fn with_failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn scrape_calls(&self) -> usize {
        self.scrape_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WebClient for MockWebClient {
    async fn search(
        &self,
        _query: &str,
        limit: usize,
        scrape: bool,
        _time_range: Option<&str>,
    ) -> Result<Vec<SearchHit>, ScrapeError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_search {
            return Err(ScrapeError::Api("search backend down".to_string()));
        }

        let hits = self
            .hits
            .iter()
            .take(limit)
            .cloned()
            .map(|mut hit| {
                if !scrape {
                    hit.markdown = None;
                    hit.links = Vec::new();
                    hit.screenshot = None;
                }
                hit
            })
            .collect();

        Ok(hits)
    }

    async fn scrape(&self, url: &str, _formats: &[String]) -> Result<ScrapedPage, ScrapeError> {
        self.scrape_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_urls.contains(url) {
            return Err(ScrapeError::Api(format!("failed to scrape {}", url)));
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Api(format!("no fixture page for {}", url)))
    }
}
