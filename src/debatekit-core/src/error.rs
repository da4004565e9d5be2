//! Error types for the debate pipeline.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Model backend error: {0}")]
    Backend(#[from] async_openai::error::OpenAIError),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DebateError {
    /// Whether another attempt at the same model call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DebateError::Backend(_) | DebateError::Timeout(_) | DebateError::EmptyResponse
        )
    }
}
