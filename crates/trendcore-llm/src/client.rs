use async_stream::stream;
use futures::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{instrument, warn};

use trendcore_config::LlmConfig;
use trendcore_types::{ChatMessage, ChatResponse, Usage};
use trendcore_utils::retry::retry_with_backoff;

use crate::error::{LlmError, Result};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const SSE_DATA_PREFIX: &str = "data: ";
const SSE_DONE: &str = "[DONE]";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(flatten)]
    extra: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client against an OpenAI-compatible `/chat/completions`
/// endpoint: bearer auth, JSON request/response, retry with exponential
/// backoff, and a line-framed SSE streaming variant.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// `LLM_API_BASE_URL`, `LLM_API_KEY`, and `LLM_MODEL_NAME` environment
    /// variables, when set, take precedence over the matching config fields.
    pub fn new(mut config: LlmConfig) -> Self {
        if let Ok(v) = std::env::var("LLM_API_BASE_URL") {
            config.api_base_url = v;
        }
        if let Ok(v) = std::env::var("LLM_API_KEY") {
            config.api_key = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL_NAME") {
            config.model_name = v;
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("reqwest client config is always valid");

        Self { client, config }
    }

    /// Base URL and API key must both be set for the client to be usable.
    pub fn is_available(&self) -> bool {
        self.config.enabled && !self.config.api_base_url.is_empty() && !self.config.api_key.is_empty()
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn endpoint(&self) -> String {
        let base = self.config.api_base_url.trim_end_matches('/');
        format!("{base}{CHAT_COMPLETIONS_PATH}")
    }

    #[instrument(skip(self, messages))]
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
        max_tokens: Option<u32>,
        extra: Value,
    ) -> Result<ChatResponse> {
        if !self.is_available() {
            return Err(LlmError::NotConfigured);
        }

        let temperature = temperature.unwrap_or(self.config.temperature);
        let max_tokens = max_tokens.unwrap_or(self.config.max_tokens);

        let extra = normalize_extra(extra);

        retry_with_backoff(self.config.max_retries, |_attempt| {
            self.send_chat_request(messages, temperature, max_tokens, extra.clone())
        })
        .await
    }

    pub async fn chat_simple(
        &self,
        prompt: &str,
        system: Option<&str>,
        extra: Value,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        let response = self.chat(&messages, None, None, extra).await?;
        Ok(response.content)
    }

    async fn send_chat_request(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
        extra: Value,
    ) -> Result<ChatResponse> {
        let request = ChatRequest {
            model: &self.config.model_name,
            messages,
            temperature,
            max_tokens,
            stream: None,
            extra,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionBody = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?;

        Ok(ChatResponse {
            content: choice.message.content,
            model: body.model,
            usage: body.usage,
            finish_reason: choice.finish_reason.unwrap_or_default(),
        })
    }

    /// Streams `delta.content` fragments from a line-framed SSE response.
    /// Malformed lines are skipped rather than aborting the stream —
    /// content continuity is prioritized over strict parsing.
    pub fn chat_stream<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> impl Stream<Item = Result<String>> + 'a {
        stream! {
            if !self.is_available() {
                yield Err(LlmError::NotConfigured);
                return;
            }

            let request = ChatRequest {
                model: &self.config.model_name,
                messages,
                temperature: temperature.unwrap_or(self.config.temperature),
                max_tokens: max_tokens.unwrap_or(self.config.max_tokens),
                stream: Some(true),
                extra: Value::Object(serde_json::Map::new()),
            };

            let response = match self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.config.api_key)
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    yield Err(classify_reqwest_error(e));
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                yield Err(LlmError::HttpStatus { status, body });
                return;
            }

            let mut buffer = String::new();
            let mut byte_stream = response.bytes_stream();

            use futures::StreamExt;
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(classify_reqwest_error(e));
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline_pos) = buffer.find('\n') {
                    let line = buffer[..newline_pos].trim_end_matches('\r').to_string();
                    buffer.drain(..=newline_pos);

                    let Some(data) = line.strip_prefix(SSE_DATA_PREFIX) else {
                        continue;
                    };
                    let data = data.trim();
                    if data == SSE_DONE {
                        return;
                    }
                    if data.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<StreamChunk>(data) {
                        Ok(parsed) => {
                            if let Some(choice) = parsed.choices.into_iter().next() {
                                if let Some(content) = choice.delta.content {
                                    if !content.is_empty() {
                                        yield Ok(content);
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "skipping malformed SSE chunk");
                        }
                    }
                }
            }
        }
    }

    /// Heuristic token estimate for pre-flight sizing: CJK code points
    /// weighted ×1.5, other whitespace-delimited tokens weighted ×1.3.
    pub fn count_tokens(&self, text: &str) -> usize {
        trendcore_utils::text::estimate_tokens(text)
    }
}

/// `#[serde(flatten)]` requires a map-shaped value; callers passing
/// `Value::Null` (the common "no extra fields" case) get an empty object.
fn normalize_extra(extra: Value) -> Value {
    if extra.is_object() {
        extra
    } else {
        Value::Object(serde_json::Map::new())
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_when_base_url_or_key_missing() {
        let config = LlmConfig::default();
        let client = LlmClient::new(config);
        assert!(!client.is_available());
    }

    #[test]
    fn available_when_base_url_and_key_set() {
        let mut config = LlmConfig::default();
        config.api_base_url = "https://api.example.com".to_string();
        config.api_key = "sk-test".to_string();
        let client = LlmClient::new(config);
        assert!(client.is_available());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let mut config = LlmConfig::default();
        config.api_base_url = "https://api.example.com/".to_string();
        config.api_key = "sk-test".to_string();
        let client = LlmClient::new(config);
        assert_eq!(client.endpoint(), "https://api.example.com/chat/completions");
    }

    #[test]
    fn count_tokens_delegates_to_the_shared_heuristic() {
        let mut config = LlmConfig::default();
        config.api_base_url = "https://api.example.com".to_string();
        config.api_key = "sk-test".to_string();
        let client = LlmClient::new(config);
        assert_eq!(
            client.count_tokens("你好世界"),
            trendcore_utils::text::estimate_tokens("你好世界")
        );
    }
}
