//! Model backend seam.
//!
//! The orchestrator and judges talk to a language model only through
//! [`ModelBackend`], constructed once and passed in as a handle.

use std::future::Future;
use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::DebateError;

/// A single chat-style request: one system prompt, one user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    /// Sampling seed for partial reproducibility. `None` leaves it to the backend.
    pub seed: Option<i64>,
    /// Ask the backend for a JSON object response.
    pub json_output: bool,
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send one request and return the generated text.
    async fn complete(&self, request: ChatRequest) -> Result<String, DebateError>;
}

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
}

impl OpenAiBackend {
    pub fn new(
        api_base: &str,
        api_key: &str,
        request_timeout: Duration,
    ) -> Result<Self, DebateError> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DebateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, DebateError> {
        Self::new(&config.api_base, &config.api_key, config.request_timeout())
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    async fn complete(&self, request: ChatRequest) -> Result<String, DebateError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: request.system.into(),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: request.user.into(),
                name: None,
            }),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&request.model)
            .messages(messages)
            .temperature(request.temperature);
        if let Some(seed) = request.seed {
            args.seed(seed);
        }
        if request.json_output {
            args.response_format(ResponseFormat::JsonObject);
        }
        let chat_request = args.build()?;

        let response = self.client.chat().create(chat_request).await?;
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        Ok(content)
    }
}

/// Per-call deadline plus bounded retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Duration,
    /// Total attempts including the first; 1 disables retry.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl CallPolicy {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            timeout: config.request_timeout(),
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Delay before attempt `attempt` (1-based): 0, base, 2*base, 4*base, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.base_delay * (1u32 << (attempt - 2).min(16))
        }
    }

    /// Run `call` under the deadline, retrying retryable failures.
    pub async fn run<F, Fut>(&self, label: &str, mut call: F) -> Result<String, DebateError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, DebateError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let delay = self.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let outcome = match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(text)) if text.trim().is_empty() => Err(DebateError::EmptyResponse),
                Ok(result) => result,
                Err(_) => Err(DebateError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(text) => {
                    debug!(call = label, attempt, "model call succeeded");
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(call = label, attempt, max_attempts, error = %e, "model call failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send `request` through `backend` under this policy.
    pub async fn complete(
        &self,
        backend: &dyn ModelBackend,
        label: &str,
        request: &ChatRequest,
    ) -> Result<String, DebateError> {
        self.run(label, || backend.complete(request.clone())).await
    }
}
