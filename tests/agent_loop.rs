//! End-to-end agent loop scenarios over scripted mock boundaries.

use std::sync::Arc;

use serde_json::json;

use deepscout::agent::{Agent, AgentError};
use deepscout::config::Config;
use deepscout::events::AgentEvent;
use deepscout::llm::mock::{MockModelClient, ScriptedReply};
use deepscout::llm::{ContentBlock, ModelError};
use deepscout::scrape::mock::MockWebClient;
use deepscout::scrape::SearchHit;

fn test_config() -> Config {
    Config::new("sk-test".to_string(), "fc-test".to_string())
}

fn thinking(text: &str) -> ContentBlock {
    ContentBlock::Thinking {
        thinking: text.to_string(),
        signature: Some("sig".to_string()),
    }
}

fn text(t: &str) -> ContentBlock {
    ContentBlock::Text {
        text: t.to_string(),
    }
}

fn tool_use(id: &str, name: &str, input: serde_json::Value) -> ContentBlock {
    ContentBlock::ToolUse {
        id: id.to_string(),
        name: name.to_string(),
        input,
    }
}

fn event_kind(event: &AgentEvent) -> &'static str {
    match event {
        AgentEvent::Start { .. } => "start",
        AgentEvent::Reasoning { .. } => "reasoning",
        AgentEvent::ToolCall { .. } => "tool_call",
        AgentEvent::ToolResult { .. } => "tool_result",
        AgentEvent::FinalAnswer { .. } => "final_answer",
        AgentEvent::Summary { .. } => "summary",
        AgentEvent::Error { .. } => "error",
    }
}

fn scraped_hit(url: &str, title: &str, markdown: &str) -> SearchHit {
    SearchHit {
        url: url.to_string(),
        title: title.to_string(),
        description: "no dates in this description".to_string(),
        markdown: Some(markdown.to_string()),
        links: vec![],
        screenshot: None,
    }
}

async fn run_collecting(
    agent: &Agent,
    query: &str,
) -> (Result<String, AgentError>, Vec<AgentEvent>) {
    let mut events = Vec::new();
    let result = agent.run(query, |event| events.push(event.clone())).await;
    (result, events)
}

#[tokio::test]
async fn full_loop_search_then_answer() {
    let llm = Arc::new(MockModelClient::new(vec![
        ScriptedReply::Respond(vec![
            thinking("I should search for current coverage."),
            tool_use(
                "toolu_01",
                "web_search",
                json!({"query": "latest AI news", "limit": 3, "scrape_content": true}),
            ),
        ]),
        ScriptedReply::Respond(vec![
            thinking("Three sources scraped; enough to answer."),
            text("Here is a roundup of the latest AI news."),
        ]),
    ]));
    let web = Arc::new(MockWebClient::new().with_hits(vec![
        scraped_hit("https://a.test/1", "Alpha", "undated body one"),
        scraped_hit("https://b.test/2", "Beta", "undated body two"),
        scraped_hit("https://c.test/3", "Gamma", "undated body three"),
    ]));

    let agent = Agent::with_clients(test_config(), llm.clone(), web);
    let (result, events) = run_collecting(&agent, "latest AI news").await;

    assert_eq!(result.unwrap(), "Here is a roundup of the latest AI news.");
    assert_eq!(llm.call_count(), 2);

    let kinds: Vec<&str> = events.iter().map(event_kind).collect();
    assert_eq!(
        kinds,
        vec![
            "start",
            "reasoning",
            "tool_call",
            "tool_result",
            "reasoning",
            "final_answer",
            "summary"
        ]
    );

    // "latest AI news" is a wants-recent query: all 3 results are selected,
    // and with no extractable dates they render in original rank order.
    let tool_result_text = events
        .iter()
        .find_map(|e| match e {
            AgentEvent::ToolResult { result, .. } => Some(result.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(tool_result_text.matches("(SCRAPED)").count(), 3);
    let alpha = tool_result_text.find("Alpha").unwrap();
    let beta = tool_result_text.find("Beta").unwrap();
    let gamma = tool_result_text.find("Gamma").unwrap();
    assert!(alpha < beta && beta < gamma);

    match events.last().unwrap() {
        AgentEvent::Summary {
            reasoning_count,
            tool_call_count,
        } => {
            assert_eq!(*reasoning_count, 2);
            assert_eq!(*tool_call_count, 1);
        }
        other => panic!("expected summary, got {:?}", other),
    }
}

#[tokio::test]
async fn sequence_numbers_are_one_based_and_monotonic() {
    let llm = Arc::new(MockModelClient::new(vec![
        ScriptedReply::Respond(vec![
            thinking("first thought"),
            tool_use(
                "toolu_01",
                "analyze_content",
                json!({"content": "good", "analysis_type": "sentiment"}),
            ),
        ]),
        ScriptedReply::Respond(vec![
            thinking("second thought"),
            tool_use(
                "toolu_02",
                "analyze_content",
                json!({"content": "bad", "analysis_type": "sentiment"}),
            ),
        ]),
        ScriptedReply::Respond(vec![text("done")]),
    ]));
    let web = Arc::new(MockWebClient::new());

    let agent = Agent::with_clients(test_config(), llm, web);
    let (result, events) = run_collecting(&agent, "how do people feel").await;

    result.unwrap();

    let reasoning_numbers: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::Reasoning { number, .. } => Some(*number),
            _ => None,
        })
        .collect();
    let tool_numbers: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::ToolCall { number, .. } => Some(*number),
            _ => None,
        })
        .collect();

    assert_eq!(reasoning_numbers, vec![1, 2]);
    assert_eq!(tool_numbers, vec![1, 2]);

    // Every tool_call precedes its tool_result.
    let kinds: Vec<&str> = events.iter().map(event_kind).collect();
    let mut pending = 0i32;
    for kind in kinds {
        match kind {
            "tool_call" => pending += 1,
            "tool_result" => {
                pending -= 1;
                assert!(pending >= 0, "tool_result before its tool_call");
            }
            _ => {}
        }
    }
}

#[tokio::test]
async fn authentication_failure_on_first_call_is_fatal_with_no_tool_events() {
    let llm = Arc::new(MockModelClient::new(vec![ScriptedReply::Fail(
        ModelError::Authentication("invalid x-api-key".to_string()),
    )]));
    let web = Arc::new(MockWebClient::new());

    let agent = Agent::with_clients(test_config(), llm, web.clone());
    let (result, events) = run_collecting(&agent, "anything").await;

    assert!(matches!(
        result,
        Err(AgentError::Model(ModelError::Authentication(_)))
    ));
    assert!(!events
        .iter()
        .any(|e| matches!(e, AgentEvent::ToolCall { .. })));
    assert_eq!(web.search_calls(), 0);
}

#[tokio::test]
async fn continuation_failure_is_fatal_with_classification_preserved() {
    let llm = Arc::new(MockModelClient::new(vec![
        ScriptedReply::Respond(vec![tool_use(
            "toolu_01",
            "analyze_content",
            json!({"content": "good", "analysis_type": "sentiment"}),
        )]),
        ScriptedReply::Fail(ModelError::ModelUnavailable("model: gone".to_string())),
    ]));
    let web = Arc::new(MockWebClient::new());

    let agent = Agent::with_clients(test_config(), llm, web);
    let (result, events) = run_collecting(&agent, "anything").await;

    assert!(matches!(
        result,
        Err(AgentError::Model(ModelError::ModelUnavailable(_)))
    ));
    // The first tool round-trip did happen before the failure.
    assert!(events
        .iter()
        .any(|e| matches!(e, AgentEvent::ToolResult { .. })));
}

#[tokio::test]
async fn tool_failure_feeds_error_text_back_and_loop_continues() {
    let llm = Arc::new(MockModelClient::new(vec![
        ScriptedReply::Respond(vec![tool_use(
            "toolu_01",
            "web_search",
            json!({"query": "anything"}),
        )]),
        ScriptedReply::Respond(vec![text("The search backend is down; cannot verify.")]),
    ]));
    let web = Arc::new(MockWebClient::new().with_failing_search());

    let agent = Agent::with_clients(test_config(), llm, web);
    let (result, events) = run_collecting(&agent, "anything").await;

    // Tool failure is not fatal: the model sees the error text and answers.
    assert!(result.is_ok());
    let tool_result_text = events
        .iter()
        .find_map(|e| match e {
            AgentEvent::ToolResult { result, .. } => Some(result.clone()),
            _ => None,
        })
        .unwrap();
    assert!(tool_result_text.starts_with("Error:"));
}

#[tokio::test]
async fn preliminary_text_alongside_tool_use_is_not_a_final_answer() {
    let llm = Arc::new(MockModelClient::new(vec![
        ScriptedReply::Respond(vec![
            text("Preliminary thoughts, not final."),
            tool_use(
                "toolu_01",
                "analyze_content",
                json!({"content": "good", "analysis_type": "sentiment"}),
            ),
        ]),
        ScriptedReply::Respond(vec![text("The real final answer.")]),
    ]));
    let web = Arc::new(MockWebClient::new());

    let agent = Agent::with_clients(test_config(), llm, web);
    let (result, events) = run_collecting(&agent, "anything").await;

    assert_eq!(result.unwrap(), "The real final answer.");

    let final_answers: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::FinalAnswer { content } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(final_answers, vec!["The real final answer."]);
}

#[tokio::test]
async fn turn_limit_is_enforced() {
    let loop_reply = || {
        ScriptedReply::Respond(vec![tool_use(
            "toolu_x",
            "analyze_content",
            json!({"content": "good", "analysis_type": "sentiment"}),
        )])
    };
    let llm = Arc::new(MockModelClient::new(vec![
        loop_reply(),
        loop_reply(),
        loop_reply(),
    ]));
    let web = Arc::new(MockWebClient::new());

    let mut config = test_config();
    config.max_turns = 2;

    let agent = Agent::with_clients(config, llm.clone(), web);
    let (result, _events) = run_collecting(&agent, "anything").await;

    assert!(matches!(result, Err(AgentError::TurnLimit(2))));
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn tool_result_event_carries_duration_and_artifacts() {
    let mut hit = scraped_hit("https://a.test/1", "Alpha", "body");
    hit.screenshot = Some("https://cdn.test/shot.png".to_string());

    let llm = Arc::new(MockModelClient::new(vec![
        ScriptedReply::Respond(vec![tool_use(
            "toolu_01",
            "web_search",
            json!({"query": "latest rust", "scrape_content": true}),
        )]),
        ScriptedReply::Respond(vec![text("done")]),
    ]));
    let web = Arc::new(MockWebClient::new().with_hits(vec![hit]));

    let agent = Agent::with_clients(test_config(), llm, web);
    let (result, events) = run_collecting(&agent, "latest rust").await;

    result.unwrap();
    let (tool, artifacts) = events
        .iter()
        .find_map(|e| match e {
            AgentEvent::ToolResult {
                tool, artifacts, ..
            } => Some((tool.clone(), artifacts.clone())),
            _ => None,
        })
        .unwrap();

    assert_eq!(tool, "Web Search");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].source_url, "https://a.test/1");
}
