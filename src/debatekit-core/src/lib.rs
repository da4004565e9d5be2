//! DebateKit Core Library
//!
//! Generates a moderated two-sided debate with a language model, scores the
//! transcript with an ensemble of model judges, and narrates the result.

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod error;
pub mod judge;
pub mod orchestrator;
pub mod prompts;
pub mod render;
pub mod seed;
pub mod speech;
pub mod subtitles;
pub mod transcript;
pub mod turn;

pub use aggregate::{AggregateVerdict, ScoreReport, aggregate};
pub use backend::{CallPolicy, ChatRequest, ModelBackend, OpenAiBackend};
pub use config::Config;
pub use error::DebateError;
pub use judge::{Criterion, JudgePanel, JudgeRunner, JudgeVerdict, SeedPlan, VerdictOutcome};
pub use orchestrator::{DebateEvent, DebateOrchestrator, DebateStep};
pub use seed::SeedSource;
pub use speech::{KokoroSpeech, SpeechEngine};
pub use transcript::{Role, RoleNames, Transcript, Utterance};
pub use turn::TurnGenerator;
