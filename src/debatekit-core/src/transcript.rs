//! The canonical, serializable record of a debate.
//!
//! A [`Transcript`] is built through a [`TranscriptLog`], which only ever
//! appends whole utterances. Once finished, the only fields that may change
//! are the audio timing fields attached by the narration stage.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DebateError;
use crate::orchestrator::schedule;

/// Version of the [`Transcript::render_judge_context`] layout.
pub const JUDGE_CONTEXT_VERSION: u32 = 1;

/// Speaking role. Ordered by role key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    DebaterA,
    DebaterB,
    Moderator,
}

impl Role {
    pub fn key(&self) -> &'static str {
        match self {
            Role::DebaterA => "debater_a",
            Role::DebaterB => "debater_b",
            Role::Moderator => "moderator",
        }
    }

    pub fn is_debater(&self) -> bool {
        !matches!(self, Role::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Display names for the three fixed roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleNames {
    pub debater_a: String,
    pub debater_b: String,
    pub moderator: String,
}

impl Default for RoleNames {
    fn default() -> Self {
        Self {
            debater_a: "A".to_string(),
            debater_b: "B".to_string(),
            moderator: "Moderator".to_string(),
        }
    }
}

impl RoleNames {
    pub fn new(
        debater_a: impl Into<String>,
        debater_b: impl Into<String>,
        moderator: impl Into<String>,
    ) -> Self {
        Self {
            debater_a: debater_a.into(),
            debater_b: debater_b.into(),
            moderator: moderator.into(),
        }
    }

    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::DebaterA => &self.debater_a,
            Role::DebaterB => &self.debater_b,
            Role::Moderator => &self.moderator,
        }
    }
}

/// One spoken turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub role: Role,
    pub text: String,
    /// 0 = opening, 1..=R = debate rounds, R+1 = closing.
    pub round: u32,
    /// Advisory target length given to the speaker. Never enforced.
    #[serde(default)]
    pub approx_words: Option<u32>,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub start_ms: Option<u64>,
    #[serde(default)]
    pub end_ms: Option<u64>,
}

impl Utterance {
    pub fn new(speaker: impl Into<String>, role: Role, text: impl Into<String>, round: u32) -> Self {
        Self {
            speaker: speaker.into(),
            role,
            text: text.into(),
            round,
            approx_words: None,
            audio_path: None,
            start_ms: None,
            end_ms: None,
        }
    }

    pub fn with_approx_words(mut self, words: u32) -> Self {
        self.approx_words = Some(words);
        self
    }
}

/// A debate transcript as persisted to `transcript.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub topic: String,
    pub rounds: u32,
    pub names: RoleNames,
    pub utterances: Vec<Utterance>,
    /// Unix seconds.
    pub created_at: i64,
}

impl Transcript {
    /// Number of utterances a complete debate of `rounds` rounds holds.
    pub fn expected_len(rounds: u32) -> usize {
        3 * rounds as usize + 2
    }

    pub fn is_complete(&self) -> bool {
        self.utterances.len() == Self::expected_len(self.rounds)
    }

    /// Check that the utterances follow the round structure exactly.
    pub fn validate(&self) -> Result<(), DebateError> {
        self.validate_prefix()?;
        if !self.is_complete() {
            return Err(DebateError::InvalidTranscript(format!(
                "expected {} utterances for {} rounds, found {}",
                Self::expected_len(self.rounds),
                self.rounds,
                self.utterances.len()
            )));
        }
        Ok(())
    }

    /// Check that the utterances present so far are a prefix of the round structure.
    pub fn validate_prefix(&self) -> Result<(), DebateError> {
        if self.rounds == 0 {
            return Err(DebateError::InvalidTranscript(
                "rounds must be at least 1".to_string(),
            ));
        }
        let steps = schedule(self.rounds);
        if self.utterances.len() > steps.len() {
            return Err(DebateError::InvalidTranscript(format!(
                "{} utterances exceed the {} a {}-round debate holds",
                self.utterances.len(),
                steps.len(),
                self.rounds
            )));
        }
        for (index, (utterance, step)) in self.utterances.iter().zip(&steps).enumerate() {
            let round = step.round(self.rounds);
            if utterance.role != step.role() || utterance.round != round {
                return Err(DebateError::InvalidTranscript(format!(
                    "utterance {} is {} in round {}, expected {} in round {}",
                    index,
                    utterance.role,
                    utterance.round,
                    step.role(),
                    round
                )));
            }
        }
        Ok(())
    }

    /// Render the transcript as judge context.
    ///
    /// This layout is a stable contract (see [`JUDGE_CONTEXT_VERSION`]):
    ///
    /// ```text
    /// Topic: <topic>
    /// Debaters: <A> (Pro) vs <B> (Con)
    ///
    /// TRANSCRIPT:
    /// [<role>|<speaker>|round <n>] <text>
    ///
    /// ```
    pub fn render_judge_context(&self) -> String {
        let mut context = format!(
            "Topic: {}\nDebaters: {} (Pro) vs {} (Con)\n\nTRANSCRIPT:\n",
            self.topic, self.names.debater_a, self.names.debater_b
        );
        for u in &self.utterances {
            context.push_str(&format!(
                "[{}|{}|round {}] {}\n\n",
                u.role, u.speaker, u.round, u.text
            ));
        }
        context
    }

    /// Attach narration output to one utterance. Text and ordering are untouched.
    pub fn attach_audio(
        &mut self,
        index: usize,
        audio_path: Option<String>,
        start_ms: u64,
        end_ms: u64,
    ) -> Result<(), DebateError> {
        let len = self.utterances.len();
        let utterance = self.utterances.get_mut(index).ok_or_else(|| {
            DebateError::InvalidTranscript(format!(
                "no utterance at index {} (transcript has {})",
                index, len
            ))
        })?;
        if end_ms < start_ms {
            return Err(DebateError::InvalidTranscript(format!(
                "utterance {} ends ({} ms) before it starts ({} ms)",
                index, end_ms, start_ms
            )));
        }
        if audio_path.is_some() {
            utterance.audio_path = audio_path;
        }
        utterance.start_ms = Some(start_ms);
        utterance.end_ms = Some(end_ms);
        Ok(())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), DebateError> {
        write_json_atomic(path.as_ref(), self)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Append-only builder for a transcript under construction.
///
/// Appending takes `&mut self`, so no reader can hold a view while an
/// utterance is being added; readers get an owned [`snapshot`](Self::snapshot).
#[derive(Debug, Clone)]
pub struct TranscriptLog {
    transcript: Transcript,
}

impl TranscriptLog {
    pub fn new(topic: impl Into<String>, rounds: u32, names: RoleNames) -> Self {
        Self {
            transcript: Transcript {
                topic: topic.into(),
                rounds,
                names,
                utterances: Vec::new(),
                created_at: chrono::Utc::now().timestamp(),
            },
        }
    }

    /// Continue a partial transcript. It must be a valid prefix.
    pub fn from_partial(transcript: Transcript) -> Result<Self, DebateError> {
        transcript.validate_prefix()?;
        Ok(Self { transcript })
    }

    pub fn append(&mut self, utterance: Utterance) {
        self.transcript.utterances.push(utterance);
    }

    pub fn len(&self) -> usize {
        self.transcript.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.utterances.is_empty()
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.transcript.utterances
    }

    pub fn topic(&self) -> &str {
        &self.transcript.topic
    }

    pub fn rounds(&self) -> u32 {
        self.transcript.rounds
    }

    pub fn names(&self) -> &RoleNames {
        &self.transcript.names
    }

    pub fn snapshot(&self) -> Transcript {
        self.transcript.clone()
    }

    pub fn finish(self) -> Transcript {
        self.transcript
    }
}

pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), DebateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
