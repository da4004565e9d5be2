//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::DebateError;
use crate::transcript::{Role, RoleNames};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The topic being debated.
    pub topic: Option<String>,
    /// Number of debate rounds between the opening and the closing.
    pub rounds: u32,
    /// Advisory target length of every turn.
    pub words_per_turn: u32,
    /// Model used for debate turns.
    pub model: String,
    /// Model used by the judge panel.
    pub judge_model: String,
    pub names: RoleNames,
    pub judges: JudgesConfig,
    pub backend: BackendConfig,
    pub voices: VoicesConfig,
    pub video: VideoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: None,
            rounds: 5,
            words_per_turn: 180,
            model: "gpt-4o-mini".to_string(),
            judge_model: "gpt-4o-mini".to_string(),
            names: RoleNames::default(),
            judges: JudgesConfig::default(),
            backend: BackendConfig::default(),
            voices: VoicesConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

/// Judge panel configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JudgesConfig {
    pub count: usize,
    /// Draw a fresh seed per judge; otherwise every judge uses `fixed_seed`.
    pub seed_variation: bool,
    pub fixed_seed: i64,
    /// Maximum judge calls in flight. 1 runs the panel sequentially.
    pub concurrency: usize,
}

impl Default for JudgesConfig {
    fn default() -> Self {
        Self {
            count: 9,
            seed_variation: true,
            fixed_seed: 42,
            concurrency: 1,
        }
    }
}

/// Model backend connection and call policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub api_base: String,
    /// Usually supplied through `OPENAI_API_KEY` rather than the file.
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            request_timeout_secs: 120,
            max_attempts: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Voice configuration for TTS.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoicesConfig {
    pub debater_a: String,
    pub debater_b: String,
    pub moderator: String,
}

impl VoicesConfig {
    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::DebaterA => &self.debater_a,
            Role::DebaterB => &self.debater_b,
            Role::Moderator => &self.moderator,
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.debater_a, &self.debater_b, &self.moderator]
    }
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            debater_a: "bf_emma".to_string(),
            debater_b: "bm_george".to_string(),
            moderator: "af_sky".to_string(),
        }
    }
}

/// Output video settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub resolution: String,
    pub background: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            resolution: "1280x720".to_string(),
            background: "black".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DebateError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from string content.
    pub fn parse(content: &str) -> Result<Self, DebateError> {
        toml::from_str(content)
            .map_err(|e| DebateError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply `OPENAI_*` environment overrides, as read by the caller.
    pub fn apply_env(&mut self, api_base: Option<String>, api_key: Option<String>) {
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.backend.api_base = base;
        }
        if let Some(key) = api_key {
            self.backend.api_key = key;
        }
    }

    /// The configured topic, if present and non-blank.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Reject configurations a debate cannot start from.
    pub fn validate(&self) -> Result<(), DebateError> {
        if self.topic().is_none() {
            return Err(DebateError::Config("a debate topic is required".to_string()));
        }
        if self.rounds == 0 {
            return Err(DebateError::Config("rounds must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Reject judge settings a panel cannot run with.
    pub fn validate_judges(&self) -> Result<(), DebateError> {
        if self.judges.count == 0 {
            return Err(DebateError::Config(
                "judge panel needs at least one judge".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.rounds, 5);
        assert_eq!(config.words_per_turn, 180);
        assert_eq!(config.judges.count, 9);
        assert!(config.judges.seed_variation);
        assert_eq!(config.judges.fixed_seed, 42);
        assert_eq!(config.names.moderator, "Moderator");
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
topic = "Cities should ban cars"
rounds = 2
words_per_turn = 120
model = "llama3:8b"

[names]
debater_a = "Alice"
debater_b = "Bob"
moderator = "Mod"

[judges]
count = 5
seed_variation = false
concurrency = 3

[backend]
api_base = "http://localhost:11434/v1"
max_attempts = 1
"#,
        )
        .unwrap();

        assert_eq!(config.topic(), Some("Cities should ban cars"));
        assert_eq!(config.rounds, 2);
        assert_eq!(config.model, "llama3:8b");
        assert_eq!(config.names.debater_a, "Alice");
        assert_eq!(config.judges.count, 5);
        assert!(!config.judges.seed_variation);
        assert_eq!(config.judges.concurrency, 3);
        assert_eq!(config.backend.api_base, "http://localhost:11434/v1");
        assert_eq!(config.backend.max_attempts, 1);
        assert_eq!(config.backend.request_timeout_secs, 120);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_topic_is_config_error() {
        let config = Config::parse("topic = \"   \"").unwrap();
        assert!(matches!(config.validate(), Err(DebateError::Config(_))));
    }

    #[test]
    fn test_zero_rounds_is_config_error() {
        let config = Config::parse("topic = \"X\"\nrounds = 0").unwrap();
        assert!(matches!(config.validate(), Err(DebateError::Config(_))));
    }

    #[test]
    fn test_empty_judge_panel_is_config_error() {
        let config = Config::parse("[judges]\ncount = 0").unwrap();
        assert!(matches!(config.validate_judges(), Err(DebateError::Config(_))));
        Config::default().validate_judges().unwrap();
    }

    #[test]
    fn test_env_overrides_backend() {
        let mut config = Config::default();
        config.apply_env(Some("http://proxy/v1".to_string()), Some("sk-test".to_string()));
        assert_eq!(config.backend.api_base, "http://proxy/v1");
        assert_eq!(config.backend.api_key, "sk-test");

        config.apply_env(Some(String::new()), None);
        assert_eq!(config.backend.api_base, "http://proxy/v1");
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        assert!(matches!(
            Config::parse("rounds = \"many\""),
            Err(DebateError::Config(_))
        ));
    }
}
