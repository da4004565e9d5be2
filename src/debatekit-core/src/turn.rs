//! Single request/response exchange for one debate turn.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::backend::{CallPolicy, ChatRequest, ModelBackend};
use crate::error::DebateError;

/// Sampling temperature for every debate turn.
pub const TURN_TEMPERATURE: f32 = 0.8;

/// Reasoning blocks some models emit ahead of their answer.
const REASONING_TAGS: [&str; 5] = ["think", "thinking", "reasoning", "reflection", "scratchpad"];

static REASONING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = REASONING_TAGS
        .iter()
        .map(|tag| format!(r"<{tag}[^>]*>.*?</{tag}>", tag = tag))
        .collect();
    Regex::new(&format!("(?is){}", alternatives.join("|"))).expect("reasoning tag pattern is valid")
});

/// Drives one turn against the model backend.
#[derive(Clone)]
pub struct TurnGenerator {
    backend: Arc<dyn ModelBackend>,
    model: String,
    policy: CallPolicy,
}

impl TurnGenerator {
    pub fn new(backend: Arc<dyn ModelBackend>, model: impl Into<String>, policy: CallPolicy) -> Self {
        Self {
            backend,
            model: model.into(),
            policy,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate one turn and return its trimmed text.
    pub async fn generate_turn(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        seed: Option<i64>,
    ) -> Result<String, DebateError> {
        let request = ChatRequest {
            model: self.model.clone(),
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
            temperature: TURN_TEMPERATURE,
            seed,
            json_output: false,
        };
        // Stripped inside the retried call so a reasoning-only reply counts as empty.
        let backend = self.backend.as_ref();
        self.policy
            .run("turn", || {
                let request = request.clone();
                async move {
                    backend
                        .complete(request)
                        .await
                        .map(|raw| strip_reasoning(&raw))
                }
            })
            .await
    }
}

/// Remove reasoning blocks and trim. Prose whitespace is left alone.
pub fn strip_reasoning(response: &str) -> String {
    REASONING_BLOCK.replace_all(response, "").trim().to_string()
}
