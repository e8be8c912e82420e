//! Real search/scrape client.

use serde::Deserialize;
use serde_json::json;

use crate::config::Config;

use super::{ScrapeError, ScrapedPage, SearchHit, WebClient};

/// Formats requested when a search is issued with scraping enabled.
const SCRAPE_FORMATS: [&str; 3] = ["markdown", "links", "screenshot@fullPage"];

pub struct FirecrawlClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("deepscout/0.1")
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key: config.firecrawl_api_key.clone(),
            base_url: "https://api.firecrawl.dev".to_string(),
        }
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ScrapeError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Api(format!("HTTP {}: {}", status, text)));
        }

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    screenshot: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "sourceURL", default)]
    source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: Option<RawHit>,
}

impl From<RawHit> for SearchHit {
    fn from(raw: RawHit) -> Self {
        let metadata = raw.metadata.unwrap_or_default();
        SearchHit {
            url: if raw.url.is_empty() {
                metadata.source_url.unwrap_or_default()
            } else {
                raw.url
            },
            title: if raw.title.is_empty() {
                metadata.title.unwrap_or_default()
            } else {
                raw.title
            },
            description: if raw.description.is_empty() {
                metadata.description.unwrap_or_default()
            } else {
                raw.description
            },
            markdown: raw.markdown,
            links: raw.links,
            screenshot: raw.screenshot,
        }
    }
}

#[async_trait::async_trait]
impl WebClient for FirecrawlClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        scrape: bool,
        time_range: Option<&str>,
    ) -> Result<Vec<SearchHit>, ScrapeError> {
        let mut body = json!({
            "query": query,
            "limit": limit,
        });

        if let Some(tbs) = time_range {
            body["tbs"] = json!(tbs);
        }
        if scrape {
            body["scrapeOptions"] = json!({ "formats": SCRAPE_FORMATS });
        }

        let response = self.post("/v1/search", body).await?;
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ScrapeError::Api(format!("malformed search response: {}", e)))?;

        Ok(parsed.data.into_iter().map(SearchHit::from).collect())
    }

    async fn scrape(&self, url: &str, formats: &[String]) -> Result<ScrapedPage, ScrapeError> {
        let body = json!({
            "url": url,
            "formats": formats,
        });

        let response = self.post("/v1/scrape", body).await?;
        let parsed: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| ScrapeError::Api(format!("malformed scrape response: {}", e)))?;

        let data = parsed
            .data
            .ok_or_else(|| ScrapeError::Api(format!("empty scrape response for {}", url)))?;
        let hit = SearchHit::from(data);

        Ok(ScrapedPage {
            markdown: hit.markdown,
            links: hit.links,
            screenshot: hit.screenshot,
            title: if hit.title.is_empty() {
                None
            } else {
                Some(hit.title)
            },
            description: if hit.description.is_empty() {
                None
            } else {
                Some(hit.description)
            },
        })
    }
}
