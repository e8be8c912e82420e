//! Content analysis tool: deterministic keyword/pattern heuristics over
//! already-fetched text. No external calls; every kind is pure and total.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use super::{Tool, ToolOutcome};

const POSITIVE_WORDS: [&str; 12] = [
    "good",
    "great",
    "excellent",
    "positive",
    "success",
    "improve",
    "growth",
    "benefit",
    "strong",
    "win",
    "gain",
    "breakthrough",
];

const NEGATIVE_WORDS: [&str; 12] = [
    "bad",
    "poor",
    "negative",
    "fail",
    "decline",
    "loss",
    "weak",
    "problem",
    "concern",
    "risk",
    "drop",
    "crisis",
];

/// The five supported analysis kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Sentiment,
    KeyFacts,
    Trends,
    Summary,
    Credibility,
}

impl AnalysisKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "sentiment" => Some(Self::Sentiment),
            "key_facts" => Some(Self::KeyFacts),
            "trends" => Some(Self::Trends),
            "summary" => Some(Self::Summary),
            "credibility" => Some(Self::Credibility),
            _ => None,
        }
    }
}

/// Analyze text content with one of the five heuristic kinds.
pub struct AnalyzeContent;

#[async_trait]
impl Tool for AnalyzeContent {
    fn name(&self) -> &str {
        "analyze_content"
    }

    fn display_name(&self) -> &str {
        "Content Analysis"
    }

    fn description(&self) -> &str {
        "Analyze already-fetched text without any network access. Supported analysis_type values: sentiment, key_facts, trends, summary, credibility."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The text to analyze"
                },
                "analysis_type": {
                    "type": "string",
                    "enum": ["sentiment", "key_facts", "trends", "summary", "credibility"],
                    "description": "Which analysis to run"
                },
                "context": {
                    "type": "string",
                    "description": "Optional context note echoed with the analysis"
                }
            },
            "required": ["content", "analysis_type"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolOutcome> {
        let content = args["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'content' argument"))?;
        let raw_kind = args["analysis_type"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'analysis_type' argument"))?;
        let context = args["context"].as_str();

        let Some(kind) = AnalysisKind::parse(raw_kind) else {
            return Ok(ToolOutcome::text(format!(
                "Unknown analysis_type '{}'. Expected one of: sentiment, key_facts, trends, summary, credibility.",
                raw_kind
            )));
        };

        Ok(ToolOutcome::text(analyze(content, kind, context)))
    }
}

/// Run one analysis kind over the content. Pure and side-effect free.
pub fn analyze(content: &str, kind: AnalysisKind, context: Option<&str>) -> String {
    let body = match kind {
        AnalysisKind::Sentiment => sentiment(content),
        AnalysisKind::KeyFacts => key_facts(content),
        AnalysisKind::Trends => trends(content),
        AnalysisKind::Summary => summary(content),
        AnalysisKind::Credibility => credibility(content),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("Context: {}\n{}", ctx, body),
        _ => body,
    }
}

fn count_occurrences(haystack: &str, needles: &[&str]) -> usize {
    needles
        .iter()
        .map(|needle| haystack.matches(needle).count())
        .sum()
}

fn sentiment(content: &str) -> String {
    let lower = content.to_lowercase();
    let positive = count_occurrences(&lower, &POSITIVE_WORDS);
    let negative = count_occurrences(&lower, &NEGATIVE_WORDS);

    let verdict = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => "Positive",
        std::cmp::Ordering::Less => "Negative",
        std::cmp::Ordering::Equal => "Neutral",
    };

    format!(
        "Sentiment: {} ({} positive signals, {} negative signals)",
        verdict, positive, negative
    )
}

fn split_sentences(content: &str) -> impl Iterator<Item = &str> {
    content
        .split_terminator(|c| c == '.' || c == '!' || c == '?')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn key_facts(content: &str) -> String {
    let factual = Regex::new(
        r"(?i)\d|%|\b(most|least|best|worst|largest|smallest|highest|lowest|fastest|first|biggest)\b",
    )
    .expect("static regex");

    let facts: Vec<&str> = split_sentences(content)
        .filter(|s| factual.is_match(s))
        .take(5)
        .collect();

    if facts.is_empty() {
        return "No quantitative or superlative facts found.".to_string();
    }

    let mut out = format!("Key facts ({}):\n", facts.len());
    for (i, fact) in facts.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, fact));
    }
    out
}

fn trends(content: &str) -> String {
    let groups: [(&str, &str); 4] = [
        ("growth", r"(?i)grow|increas|ris\w|surg|expand|accelerat"),
        ("decline", r"(?i)declin|decreas|fall|drop|shrink|slow"),
        (
            "innovation",
            r"(?i)innovat|breakthrough|novel|cutting-edge|state-of-the-art",
        ),
        ("adoption", r"(?i)adopt|deploy|integrat|roll out|implement"),
    ];

    let matched: Vec<&str> = groups
        .iter()
        .filter(|(_, pattern)| {
            Regex::new(pattern)
                .expect("static regex")
                .is_match(content)
        })
        .map(|(name, _)| *name)
        .collect();

    if matched.is_empty() {
        "No clear trend signals detected.".to_string()
    } else {
        format!("Trend signals detected: {}", matched.join(", "))
    }
}

fn summary(content: &str) -> String {
    let reporting = Regex::new(
        r"(?i)\b(announc|launch|report|found|reveal|show|introduc|confirm|conclud|demonstrat)",
    )
    .expect("static regex");

    let picked: Vec<String> = split_sentences(content)
        .filter(|s| s.len() >= 20 && reporting.is_match(s))
        .take(3)
        .map(|s| format!("{}.", s))
        .collect();

    if picked.is_empty() {
        "No summary-worthy statements found.".to_string()
    } else {
        picked.join(" ")
    }
}

fn credibility(content: &str) -> String {
    let checks: [(&str, &str); 4] = [
        (
            "cites sources",
            r"(?i)according to|cited|\bsource\b|study|research|\breport\b",
        ),
        ("includes data/statistics", r"%|\b\d+(\.\d+)?\b"),
        (
            "official language or domain",
            r"(?i)\.gov|\.edu|official|government|university",
        ),
        (
            "recency markers",
            r"(?i)today|yesterday|this week|this month|recent|latest|20[2-9]\d",
        ),
    ];

    let mut score = 0;
    let mut lines = Vec::new();
    for (label, pattern) in checks {
        let hit = Regex::new(pattern).expect("static regex").is_match(content);
        if hit {
            score += 1;
        }
        lines.push(format!("- {}: {}", label, if hit { "yes" } else { "no" }));
    }

    format!("Credibility score: {}/4\n{}", score, lines.join("\n"))
}
