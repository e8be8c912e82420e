//! Deep scrape tool: scrape a source page, then optionally follow a filtered
//! subset of its outbound links concurrently.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use regex::RegexBuilder;
use serde_json::{json, Value};
use tracing::warn;

use crate::scrape::{ScrapedPage, WebClient};

use super::{preview, Tool, ToolOutcome, VisualArtifact};

/// Chars of source markdown shown before truncation.
const SOURCE_PREVIEW_CHARS: usize = 3000;
/// Chars of followed-page content shown per link.
const LINK_PREVIEW_CHARS: usize = 500;

/// Scrape a page and follow matching outbound links.
pub struct DeepScrape {
    web: Arc<dyn WebClient>,
}

impl DeepScrape {
    pub fn new(web: Arc<dyn WebClient>) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for DeepScrape {
    fn name(&self) -> &str {
        "deep_scrape"
    }

    fn display_name(&self) -> &str {
        "Deep Scrape"
    }

    fn description(&self) -> &str {
        "Scrape a URL for its content and outbound links. Link following is opt-in: supply link_filter (a case-insensitive pattern) to also scrape up to max_links matching links concurrently."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "source_url": {
                    "type": "string",
                    "description": "The URL to scrape"
                },
                "link_filter": {
                    "type": "string",
                    "description": "Optional case-insensitive pattern; only matching outbound links are followed"
                },
                "max_depth": {
                    "type": "integer",
                    "description": "Scrape depth (default: 1). Depths beyond 1 are reported, not followed."
                },
                "max_links": {
                    "type": "integer",
                    "description": "Maximum matching links to attempt scraping (default: 5)"
                },
                "formats": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Content formats to request (default: [\"markdown\"])"
                }
            },
            "required": ["source_url"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolOutcome> {
        let source_url = args["source_url"]
            .as_str()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing 'source_url' argument"))?;
        let link_filter = args["link_filter"].as_str();
        let max_depth = args["max_depth"].as_u64().unwrap_or(1);
        let max_links = args["max_links"].as_u64().unwrap_or(5) as usize;
        let formats: Vec<String> = args["formats"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .filter(|f: &Vec<String>| !f.is_empty())
            .unwrap_or_else(|| vec!["markdown".to_string()]);

        let source_formats = with_capture_formats(&formats);
        let source = match self.web.scrape(source_url, &source_formats).await {
            Ok(page) => page,
            Err(e) => {
                return Ok(ToolOutcome::text(format!(
                    "Could not scrape {}: {}. Try web_search with scrape_content=true as a fallback.",
                    source_url, e
                )));
            }
        };

        let Some(markdown) = source.markdown.as_deref().filter(|m| !m.is_empty()) else {
            return Ok(ToolOutcome::text(format!(
                "Scrape of {} returned no content. Try web_search with scrape_content=true as a fallback.",
                source_url
            )));
        };

        let mut artifacts = Vec::new();
        if let Some(payload) = &source.screenshot {
            artifacts.push(VisualArtifact {
                source_url: source_url.to_string(),
                payload: payload.clone(),
            });
        }

        let title = source.title.as_deref().unwrap_or(source_url);
        let mut out = format!("Scraped: {}\nURL: {}\n\n", title, source_url);
        if markdown.len() > SOURCE_PREVIEW_CHARS {
            let mut cut = SOURCE_PREVIEW_CHARS;
            while !markdown.is_char_boundary(cut) {
                cut -= 1;
            }
            out.push_str(&markdown[..cut]);
            out.push_str("\n... [content truncated]");
        } else {
            out.push_str(markdown);
        }

        // Link following is opt-in to bound cost.
        let Some(filter) = link_filter.filter(|f| !f.is_empty()) else {
            out.push_str(&format!(
                "\n\n{} outbound links found. Pass link_filter to follow a subset of them.",
                source.links.len()
            ));
            return Ok(ToolOutcome::with_artifacts(out, artifacts));
        };

        let matched: Vec<&String> = filter_links(&source.links, filter);
        let attempted: Vec<&String> = matched.iter().take(max_links).copied().collect();

        let scrapes = attempted.iter().copied().map(|link| {
            let formats = source_formats.clone();
            async move { (link.as_str(), self.web.scrape(link, &formats).await) }
        });
        let results = join_all(scrapes).await;

        let mut followed: Vec<(&str, ScrapedPage)> = Vec::new();
        for (link, result) in results {
            match result {
                Ok(page) => followed.push((link, page)),
                Err(e) => {
                    // Partial success is expected and normal.
                    warn!("Skipping failed link scrape {}: {}", link, e);
                }
            }
        }

        out.push_str(&format!(
            "\n\nFollowed {} of {} attempted links ({} matched filter \"{}\"):\n",
            followed.len(),
            attempted.len(),
            matched.len(),
            filter
        ));

        for (i, (link, page)) in followed.iter().enumerate() {
            let title = page.title.as_deref().unwrap_or(*link);
            out.push_str(&format!("\n{}. {}\n   {}\n", i + 1, title, link));
            if let Some(description) = page.description.as_deref().filter(|d| !d.is_empty()) {
                out.push_str(&format!("   {}\n", description));
            }
            let body = page.markdown.as_deref().unwrap_or("");
            out.push_str(&format!(
                "   Preview: {}\n",
                preview(body, LINK_PREVIEW_CHARS)
            ));
            if let Some(payload) = &page.screenshot {
                out.push_str("   [page captured]\n");
                artifacts.push(VisualArtifact {
                    source_url: link.to_string(),
                    payload: payload.clone(),
                });
            }
            if max_depth > 1 && !page.links.is_empty() {
                out.push_str(&format!(
                    "   {} further links available at depth 2 (not followed)\n",
                    page.links.len()
                ));
            }
        }

        Ok(ToolOutcome::with_artifacts(out, artifacts))
    }
}

/// Requested formats plus the link list and full-page capture the tool
/// always needs.
fn with_capture_formats(formats: &[String]) -> Vec<String> {
    let mut all = formats.to_vec();
    for extra in ["links", "screenshot@fullPage"] {
        if !all.iter().any(|f| f == extra) {
            all.push(extra.to_string());
        }
    }
    all
}

/// Filter links by a case-insensitive pattern. An invalid regex degrades to
/// a literal substring match rather than failing the call.
fn filter_links<'a>(links: &'a [String], filter: &str) -> Vec<&'a String> {
    let pattern = RegexBuilder::new(filter)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(filter))
                .case_insensitive(true)
                .build()
        });

    match pattern {
        Ok(re) => links.iter().filter(|l| re.is_match(l)).collect(),
        Err(_) => Vec::new(),
    }
}
