//! `ModelService` backed by an OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use neurograph_core::{ChatResponse, Graph};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::prompt::{analysis_payload, chat_payload, scrub_response, PromptTemplate};
use crate::resolver::LlmResolver;
use crate::{AnalysisRequest, ChatRequest, ModelService};

/// Default bound on a single model call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_ERROR_BODY: usize = 512;

/// HTTP client for an OpenAI-compatible API.
pub struct OpenAiService {
    resolver: LlmResolver,
    client: Client,
    timeout: Duration,
    analysis_prompt: PromptTemplate,
    chat_prompt: PromptTemplate,
}

impl OpenAiService {
    /// Build the service with the default timeout.
    pub fn new(resolver: LlmResolver) -> ServiceResult<Self> {
        Self::with_timeout(resolver, DEFAULT_TIMEOUT)
    }

    /// Build the service with an explicit per-call timeout.
    pub fn with_timeout(resolver: LlmResolver, timeout: Duration) -> ServiceResult<Self> {
        if resolver.api_url.trim().is_empty() {
            return Err(ServiceError::Config("api_url must not be empty".into()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            resolver,
            client,
            timeout,
            analysis_prompt: PromptTemplate::analysis(),
            chat_prompt: PromptTemplate::chat(),
        })
    }

    /// Convenience constructor using resolver configuration from the environment.
    pub fn from_env() -> ServiceResult<Self> {
        Self::new(LlmResolver::from_env())
    }

    async fn invoke_model(&self, messages: Vec<Value>) -> ServiceResult<String> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.resolver.api_key.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.resolver.api_key))
                    .map_err(|_| ServiceError::Config("invalid api key header".into()))?,
            );
        }

        let body = json!({
            "model": self.resolver.model_name,
            "messages": messages,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(self.resolver.completions_url())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body: clip(text, MAX_ERROR_BODY),
            });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|e| self.classify(e))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ServiceError::EmptyCompletion)?;

        debug!(target: "neurograph::llm", chars = content.len(), "llm_response_received");
        Ok(content)
    }

    fn classify(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout {
                after: self.timeout,
            }
        } else {
            ServiceError::from(err)
        }
    }
}

/// Parse the model's text into a typed value.
pub(crate) fn parse_json<T: DeserializeOwned>(raw: &str) -> ServiceResult<T> {
    let cleaned = scrub_response(raw);
    serde_json::from_str(cleaned).map_err(|err| {
        warn!(target: "neurograph::llm", "failed to parse llm response: {err}");
        ServiceError::Malformed(err.to_string())
    })
}

#[async_trait]
impl ModelService for OpenAiService {
    async fn analyze(&self, request: &AnalysisRequest) -> ServiceResult<Graph> {
        let messages = vec![
            json!({"role": "system", "content": self.analysis_prompt.system_prompt}),
            json!({"role": "user", "content": analysis_payload(request)}),
        ];
        let raw = self.invoke_model(messages).await?;
        parse_json(&raw)
    }

    async fn chat(&self, request: &ChatRequest) -> ServiceResult<ChatResponse> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(json!({"role": "system", "content": self.chat_prompt.system_prompt}));
        for message in &request.history {
            messages.push(json!({
                "role": message.role.completion_role(),
                "content": message.text,
            }));
        }
        messages.push(json!({"role": "user", "content": chat_payload(request)}));

        let raw = self.invoke_model(messages).await?;
        parse_json(&raw)
    }

    fn name(&self) -> String {
        self.resolver.model_name.clone()
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Shorten `text` to at most `limit` bytes without splitting a character.
fn clip(mut text: String, limit: usize) -> String {
    if text.len() > limit {
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
