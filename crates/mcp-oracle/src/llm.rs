//! LLM-backed classification oracle.
//!
//! Talks to any OpenAI-compatible chat completions endpoint. The prompt
//! carries the operation's identity and a bounded sample of its response,
//! and asks for a strict three-tier JSON answer.
//!
//! # Examples
//!
//! ```no_run
//! use mcp_gateway_core::{OperationDescriptor, OperationName, OracleConfig};
//! use mcp_gateway_oracle::{ClassificationOracle, LlmClassifier};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), mcp_gateway_core::Error> {
//! let classifier = LlmClassifier::new(OracleConfig::new(std::env::var("OPENAI_API_KEY").unwrap()))?;
//! let descriptor = OperationDescriptor::bare(OperationName::new("ado_get_item"));
//! let schema = classifier.classify(&descriptor, &json!({"id": 1})).await?;
//! println!("pinned: {:?}", schema.pinned);
//! # Ok(())
//! # }
//! ```

use crate::ClassificationOracle;
use crate::parse::parse_classification;
use crate::sample::render_sample;
use async_trait::async_trait;
use mcp_gateway_adaptive::SchemaClassification;
use mcp_gateway_core::{Error, OperationDescriptor, OracleConfig, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const SYSTEM_INSTRUCTIONS: &str = "Output valid JSON only.";

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat completions response, reduced to what we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Classification oracle backed by an OpenAI-compatible LLM.
#[derive(Debug, Clone)]
pub struct LlmClassifier {
    config: OracleConfig,
    client: reqwest::Client,
}

impl LlmClassifier {
    /// Creates a classifier from oracle settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the HTTP client cannot be built.
    pub fn new(config: OracleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::ConfigError {
                message: format!("failed to build HTTP client for oracle: {e}"),
            })?;
        Ok(Self { config, client })
    }

    /// Model used for classification.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Builds the classification prompt.
    fn build_prompt(&self, descriptor: &OperationDescriptor, sample: &Value) -> String {
        let description = if descriptor.description.is_empty() {
            "No description provided."
        } else {
            descriptor.description.as_str()
        };
        let arguments =
            serde_json::to_string(&descriptor.parameters).unwrap_or_else(|_| "[]".to_string());
        let sample = render_sample(sample, self.config.max_sample_chars);

        format!(
            r#"You are a data architect trimming API responses to save tokens.

An API operation is being called. Its output is large; classify its fields so
the important ones are always shown and the rest can be hidden.

OPERATION:
  Name: "{name}"
  Description: "{description}"
  Input arguments: {arguments}

DATA SAMPLE:
{sample}

Classify the fields of the sample into three tiers:

1. "pinned" (identity): fields required to identify the result, such as ids,
   names, titles, status and types. If the object is a node in a graph (a work
   item, file or pull request), pin 'relations', 'links' or 'parent' fields so
   the hierarchy can be traversed.

2. "noise" (trash): technical metadata with no business value, such as
   redundant urls, _links, watermarks, ETags, internal hashes, avatar URLs.

3. "ghosts" (vault): everything else. Useful but heavy: descriptions, bodies,
   dates, creators, tags, custom fields, priorities.

OUTPUT RULES:
- Return strict JSON: {{ "pinned": [], "noise": [], "ghosts": [] }}
- Use dot notation for nested keys (e.g. "fields.System.Title").
- Put each field in exactly one tier.
- Do not invent fields that are not in the sample.
- No markdown, no comments."#,
            name = descriptor.name,
        )
    }

    async fn complete(&self, operation: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTIONS,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        operation: format!("classify {operation}"),
                        duration_secs: self.config.timeout_secs,
                    }
                } else {
                    Error::ExecutionError {
                        message: format!("Failed to call classification API: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::ExecutionError {
                message: format!("Classification API request failed: {status} - {error_text}"),
                source: None,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| Error::ExecutionError {
            message: format!("Failed to read classification API response: {e}"),
            source: Some(Box::new(e)),
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::ClassificationFailed {
                operation: operation.to_string(),
                reason: "empty completion".to_string(),
            })
    }
}

#[async_trait]
impl ClassificationOracle for LlmClassifier {
    async fn classify(
        &self,
        descriptor: &OperationDescriptor,
        sample: &Value,
    ) -> Result<SchemaClassification> {
        let operation = descriptor.name.as_str();
        let prompt = self.build_prompt(descriptor, sample);
        debug!(
            operation,
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Requesting classification"
        );

        let answer = self.complete(operation, &prompt).await?;
        parse_classification(&answer, operation)
    }
}
