//! Integration tests: canned oracle answers through parsing and fallback.

use async_trait::async_trait;
use mcp_gateway_adaptive::SchemaClassification;
use mcp_gateway_core::{OperationDescriptor, OperationName, Result};
use mcp_gateway_oracle::{
    ClassificationOracle, classify_or_fallback, fallback_classification, parse_classification,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Oracle that answers with fixed text, the way an LLM would.
struct CannedOracle {
    answer: &'static str,
    calls: AtomicUsize,
}

impl CannedOracle {
    const fn new(answer: &'static str) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ClassificationOracle for CannedOracle {
    async fn classify(
        &self,
        descriptor: &OperationDescriptor,
        _sample: &Value,
    ) -> Result<SchemaClassification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parse_classification(self.answer, descriptor.name.as_str())
    }
}

fn pull_request() -> Value {
    json!({
        "number": 42,
        "title": "Add gateway",
        "state": "open",
        "body": "Long description",
        "user": {"login": "octo", "avatar_url": "https://avatars/1"},
        "_links": {"self": {"href": "https://api/pulls/42"}}
    })
}

fn descriptor() -> OperationDescriptor {
    OperationDescriptor::new(
        OperationName::new("gh_get_pull_request"),
        "[Source: gh] Get a pull request",
        vec!["owner".into(), "repo".into(), "number".into()],
    )
}

#[tokio::test]
async fn test_fenced_answer_is_accepted() {
    let oracle = CannedOracle::new(
        "```json\n{\"pinned\": [\"number\", \"title\", \"state\"], \"noise\": [\"_links\", \"user.avatar_url\"], \"ghosts\": [\"body\", \"user.login\"]}\n```",
    );
    let schema =
        classify_or_fallback(&oracle, &descriptor(), &pull_request(), Duration::from_secs(5)).await;

    assert_eq!(schema.pinned, vec!["number", "title", "state"]);
    assert_eq!(schema.ghosts, vec!["body", "user.login"]);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_prose_answer_falls_back() {
    let oracle = CannedOracle::new("Sorry, I can't classify this payload.");
    let schema =
        classify_or_fallback(&oracle, &descriptor(), &pull_request(), Duration::from_secs(5)).await;

    assert_eq!(schema, fallback_classification(&pull_request()));
    assert_eq!(schema.pinned.len(), 6);
}

#[tokio::test]
async fn test_overlapping_answer_falls_back() {
    let oracle = CannedOracle::new(
        r#"{"pinned": ["number", "body"], "noise": [], "ghosts": ["body"]}"#,
    );
    let schema =
        classify_or_fallback(&oracle, &descriptor(), &pull_request(), Duration::from_secs(5)).await;

    assert!(schema.ghosts.is_empty());
    assert!(schema.noise.is_empty());
    assert!(schema.pinned.iter().any(|p| p == "_links"));
}
