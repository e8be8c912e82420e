//! Scripted model client for offline, deterministic loop tests.
//!
//! Replays a recorded sequence of responses: each `complete` call pops the
//! next scripted reply in order, regardless of request content. Errors can be
//! scripted too, to exercise the loop's fatal-failure classification.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::{ContentBlock, ModelClient, ModelError, Turn};

/// One scripted model turn.
pub enum ScriptedReply {
    /// Return these blocks as the model response.
    Respond(Vec<ContentBlock>),
    /// Fail the call with this error.
    Fail(ModelError),
}

/// Model client that replays scripted replies in order.
pub struct MockModelClient {
    script: Mutex<VecDeque<ScriptedReply>>,
    calls: AtomicUsize,
}

impl MockModelClient {
    pub fn new(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether every scripted reply has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.script.lock().map(|s| s.is_empty()).unwrap_or(true)
    }
}

#[async_trait::async_trait]
impl ModelClient for MockModelClient {
    async fn complete(
        &self,
        _system: &str,
        _turns: &[Turn],
        _tools: &[Value],
    ) -> Result<Vec<ContentBlock>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .ok_or_else(|| ModelError::Api("mock script exhausted".to_string()))?;

        match next {
            ScriptedReply::Respond(blocks) => Ok(blocks),
            ScriptedReply::Fail(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_exhausts() {
        let mock = MockModelClient::new(vec![
            ScriptedReply::Respond(vec![ContentBlock::Text {
                text: "first".to_string(),
            }]),
            ScriptedReply::Respond(vec![ContentBlock::Text {
                text: "second".to_string(),
            }]),
        ]);

        let r1 = mock.complete("", &[], &[]).await.unwrap();
        assert!(matches!(&r1[0], ContentBlock::Text { text } if text == "first"));

        let r2 = mock.complete("", &[], &[]).await.unwrap();
        assert!(matches!(&r2[0], ContentBlock::Text { text } if text == "second"));
        assert!(mock.is_exhausted());

        let r3 = mock.complete("", &[], &[]).await;
        assert!(matches!(r3, Err(ModelError::Api(_))));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockModelClient::new(vec![ScriptedReply::Fail(ModelError::Authentication(
            "invalid x-api-key".to_string(),
        ))]);

        let result = mock.complete("", &[], &[]).await;
        assert!(matches!(result, Err(ModelError::Authentication(_))));
    }
}
