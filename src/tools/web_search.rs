//! Web search tool with intent-aware selection of results to scrape.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::scrape::{SearchHit, WebClient};

use super::{preview, Tool, ToolOutcome, VisualArtifact};

/// Chars of content scanned for a publication date.
const DATE_SCAN_CHARS: usize = 1000;
/// Chars of scraped content shown per result.
const PREVIEW_CHARS: usize = 500;

/// Search the web, optionally scraping the most relevant results.
pub struct WebSearch {
    web: Arc<dyn WebClient>,
}

impl WebSearch {
    pub fn new(web: Arc<dyn WebClient>) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn display_name(&self) -> &str {
        "Web Search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns titles, URLs and descriptions. Set scrape_content=true to also fetch page content for the most relevant results, selected by query intent (recent news, blog posts, documentation)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)"
                },
                "scrape_content": {
                    "type": "boolean",
                    "description": "Whether to scrape page content for selected results (default: false)"
                },
                "tbs": {
                    "type": "string",
                    "enum": ["qdr:h", "qdr:d", "qdr:w", "qdr:m", "qdr:y"],
                    "description": "Optional time range filter (past hour/day/week/month/year)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolOutcome> {
        let query = args["query"]
            .as_str()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let limit = args["limit"].as_u64().unwrap_or(5) as usize;
        let scrape_content = args["scrape_content"].as_bool().unwrap_or(false);
        let time_range = args["tbs"].as_str();

        // Metadata-only pass first; scraping is a second, separate call.
        let hits = self.web.search(query, limit, false, time_range).await?;

        if hits.is_empty() {
            return Ok(ToolOutcome::text(format!(
                "No results found for \"{}\". Try a broader or differently worded query.",
                query
            )));
        }

        if !scrape_content {
            return Ok(ToolOutcome::text(render_listing(query, &hits)));
        }

        let signals = classify_query(query, time_range);
        debug!(?signals, query, "classified query intent");

        let selected = select_indices(&hits, limit, &signals);
        let selected_urls: HashSet<&str> = selected.iter().map(|&i| hits[i].url.as_str()).collect();

        // The upstream search only supports an all-or-nothing scrape flag, so
        // re-issue the same search with scraping on and keep the selected URLs.
        let scraped = self.web.search(query, limit, true, time_range).await?;

        let mut records: Vec<ScrapedRecord> = scraped
            .into_iter()
            .enumerate()
            .filter(|(_, hit)| selected_urls.contains(hit.url.as_str()))
            .filter(|(_, hit)| hit.markdown.as_deref().is_some_and(|m| !m.is_empty()))
            .map(|(rank, hit)| {
                let date = if signals.wants_recent || signals.wants_blog {
                    extract_publication_date(&hit)
                } else {
                    None
                };
                ScrapedRecord { rank, date, hit }
            })
            .collect();

        if signals.wants_recent && records.iter().any(|r| r.date.is_some()) {
            // Dated results first, newest first; ties keep original rank.
            records.sort_by(|a, b| match (a.date, b.date) {
                (Some(da), Some(db)) => db.cmp(&da).then(a.rank.cmp(&b.rank)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.rank.cmp(&b.rank),
            });
        }

        let artifacts: Vec<VisualArtifact> = records
            .iter()
            .filter_map(|r| {
                r.hit.screenshot.as_ref().map(|payload| VisualArtifact {
                    source_url: r.hit.url.clone(),
                    payload: payload.clone(),
                })
            })
            .collect();

        let text = render_scraped(query, selected.len(), &records);
        Ok(ToolOutcome::with_artifacts(text, artifacts))
    }
}

struct ScrapedRecord {
    rank: usize,
    date: Option<NaiveDate>,
    hit: SearchHit,
}

/// Query-intent signals steering which results get scraped.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct QuerySignals {
    pub wants_recent: bool,
    pub wants_blog: bool,
    pub wants_docs: bool,
    pub has_time_filter: bool,
    pub has_site_filter: bool,
}

pub(crate) fn classify_query(query: &str, time_range: Option<&str>) -> QuerySignals {
    let recent =
        Regex::new(r"(?i)\b(latest|recent|today|current|breaking|now|this (week|month|year)|20[2-9]\d)\b")
            .expect("static regex");
    let blog = Regex::new(r"(?i)\b(blog|post|article|news)\b").expect("static regex");
    let docs =
        Regex::new(r"(?i)\b(docs?|documentation|api|reference|guide)\b").expect("static regex");

    QuerySignals {
        wants_recent: recent.is_match(query),
        wants_blog: blog.is_match(query),
        wants_docs: docs.is_match(query),
        has_time_filter: time_range.is_some(),
        has_site_filter: query.contains("site:"),
    }
}

/// Pick which results to scrape, by priority: time-sensitive queries take
/// everything (already filtered upstream); blog/docs queries take pattern
/// matches with a top-3 fallback; everything else takes the top ranks.
pub(crate) fn select_indices(
    hits: &[SearchHit],
    limit: usize,
    signals: &QuerySignals,
) -> Vec<usize> {
    if signals.wants_recent || signals.has_time_filter {
        return (0..hits.len()).collect();
    }

    if signals.wants_blog || signals.wants_docs {
        let pattern = if signals.wants_blog {
            Regex::new(r"(?i)blog|post|article|news").expect("static regex")
        } else {
            Regex::new(r"(?i)doc|api|guide|reference").expect("static regex")
        };

        let matched: Vec<usize> = hits
            .iter()
            .enumerate()
            .filter(|(_, hit)| {
                pattern.is_match(&url_path(&hit.url))
                    || pattern.is_match(&hit.title)
                    || pattern.is_match(&hit.description)
            })
            .map(|(i, _)| i)
            .collect();

        if matched.is_empty() {
            return (0..hits.len().min(3)).collect();
        }
        return matched;
    }

    (0..hits.len().min(limit.min(5))).collect()
}

fn url_path(raw: &str) -> String {
    Url::parse(raw)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Scan the first chunk of content plus title/description for a publication
/// date, trying the patterns in order and accepting the first match that
/// parses to a year >= 2020. A pattern's earlier matches that fail the year
/// check do not mask its later ones.
pub(crate) fn extract_publication_date(hit: &SearchHit) -> Option<NaiveDate> {
    let content = hit.markdown.as_deref().unwrap_or("");
    let mut cut = DATE_SCAN_CHARS.min(content.len());
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    let haystack = format!("{}\n{}\n{}", &content[..cut], hit.title, hit.description);

    let iso = Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("static regex");
    for c in iso.captures_iter(&haystack) {
        if let Some(date) = ymd(&c[1], &c[2], &c[3]) {
            return Some(date);
        }
    }

    let month_first = Regex::new(
        r"(?i)\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .expect("static regex");
    for c in month_first.captures_iter(&haystack) {
        if let Some(date) =
            month_number(&c[1]).and_then(|month| ymd_nums(&c[3], month, &c[2]))
        {
            return Some(date);
        }
    }

    let day_first = Regex::new(
        r"(?i)\b(\d{1,2})\s+(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})\b",
    )
    .expect("static regex");
    for c in day_first.captures_iter(&haystack) {
        if let Some(date) =
            month_number(&c[2]).and_then(|month| ymd_nums(&c[3], month, &c[1]))
        {
            return Some(date);
        }
    }

    let slashed = Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("static regex");
    for c in slashed.captures_iter(&haystack) {
        if let Some(date) = ymd(&c[3], &c[1], &c[2]) {
            return Some(date);
        }
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(
        year.parse().ok()?,
        month.parse().ok()?,
        day.parse().ok()?,
    )?;
    (date.year() >= 2020).then_some(date)
}

fn ymd_nums(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)?;
    (date.year() >= 2020).then_some(date)
}

fn month_number(name: &str) -> Option<u32> {
    let months = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    months
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

fn render_listing(query: &str, hits: &[SearchHit]) -> String {
    let mut out = format!("Found {} results for \"{}\":\n", hits.len(), query);

    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {}\n   {}\n   {}\n",
            i + 1,
            hit.title,
            hit.url,
            hit.description
        ));
    }

    out
}

fn render_scraped(query: &str, selected: usize, records: &[ScrapedRecord]) -> String {
    let mut out = format!(
        "Scraped {} of {} selected results for \"{}\":\n",
        records.len(),
        selected,
        query
    );

    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {} (SCRAPED)\n   {}\n",
            i + 1,
            record.hit.title,
            record.hit.url
        ));
        if let Some(date) = record.date {
            out.push_str(&format!("   Published: {}\n", date));
        }
        let body = record.hit.markdown.as_deref().unwrap_or("");
        out.push_str(&format!("   Preview: {}\n", preview(body, PREVIEW_CHARS)));

        let first_links = record
            .hit
            .links
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if first_links.is_empty() {
            out.push_str(&format!("   Links: {} outbound\n", record.hit.links.len()));
        } else {
            out.push_str(&format!(
                "   Links: {} outbound (first 3: {})\n",
                record.hit.links.len(),
                first_links
            ));
        }
    }

    out
}
