//! Debate orchestration logic.
//!
//! Walks the fixed phase sequence `Opening -> (DebaterA, DebaterB, CrossExam) x R
//! -> Closing`, committing each utterance to the transcript as soon as it is
//! produced.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::DebateError;
use crate::prompts::{self, PromptTemplate};
use crate::seed::SeedSource;
use crate::transcript::{Role, RoleNames, Transcript, TranscriptLog, Utterance};
use crate::turn::TurnGenerator;

/// One step of the debate state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebateStep {
    Opening,
    DebaterA(u32),
    DebaterB(u32),
    CrossExam(u32),
    Closing,
}

impl DebateStep {
    pub fn role(&self) -> Role {
        match self {
            DebateStep::DebaterA(_) => Role::DebaterA,
            DebateStep::DebaterB(_) => Role::DebaterB,
            DebateStep::Opening | DebateStep::CrossExam(_) | DebateStep::Closing => {
                Role::Moderator
            }
        }
    }

    /// Round tag of the utterance this step produces.
    pub fn round(&self, rounds: u32) -> u32 {
        match self {
            DebateStep::Opening => 0,
            DebateStep::DebaterA(r) | DebateStep::DebaterB(r) | DebateStep::CrossExam(r) => *r,
            DebateStep::Closing => rounds + 1,
        }
    }

    /// The step after this one, or `None` once the debate is done.
    pub fn next(self, rounds: u32) -> Option<DebateStep> {
        match self {
            DebateStep::Opening if rounds == 0 => Some(DebateStep::Closing),
            DebateStep::Opening => Some(DebateStep::DebaterA(1)),
            DebateStep::DebaterA(r) => Some(DebateStep::DebaterB(r)),
            DebateStep::DebaterB(r) => Some(DebateStep::CrossExam(r)),
            DebateStep::CrossExam(r) if r < rounds => Some(DebateStep::DebaterA(r + 1)),
            DebateStep::CrossExam(_) => Some(DebateStep::Closing),
            DebateStep::Closing => None,
        }
    }
}

/// Every step of a `rounds`-round debate, in speaking order.
pub fn schedule(rounds: u32) -> Vec<DebateStep> {
    std::iter::successors(Some(DebateStep::Opening), |step| step.next(rounds)).collect()
}

/// Callback for debate events.
pub type DebateCallback = Box<dyn Fn(DebateEvent) + Send + Sync>;

/// Events emitted during a debate.
#[derive(Debug, Clone)]
pub enum DebateEvent {
    /// A speaker is about to be prompted.
    StepStart {
        step: DebateStep,
        speaker: String,
        round: u32,
    },
    /// An utterance has been committed to the transcript.
    Spoken { utterance: Utterance },
    /// The debate has concluded.
    DebateEnd,
}

/// Orchestrates one debate from topic to finished transcript.
pub struct DebateOrchestrator {
    turns: TurnGenerator,
    words_per_turn: u32,
    log: TranscriptLog,
    seeds: SeedSource,
    /// Rewritten after every committed utterance.
    checkpoint: Option<PathBuf>,
    callback: Option<DebateCallback>,
}

impl DebateOrchestrator {
    pub fn new(
        turns: TurnGenerator,
        topic: impl Into<String>,
        rounds: u32,
        words_per_turn: u32,
        names: RoleNames,
    ) -> Result<Self, DebateError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(DebateError::Config("a debate topic is required".to_string()));
        }
        if rounds == 0 {
            return Err(DebateError::Config("rounds must be at least 1".to_string()));
        }

        Ok(Self::with_log(
            turns,
            words_per_turn,
            TranscriptLog::new(topic, rounds, names),
        ))
    }

    /// Continue a debate from a partial transcript.
    pub fn resume(
        turns: TurnGenerator,
        partial: Transcript,
        words_per_turn: u32,
    ) -> Result<Self, DebateError> {
        let log = TranscriptLog::from_partial(partial)?;
        Ok(Self::with_log(turns, words_per_turn, log))
    }

    fn with_log(turns: TurnGenerator, words_per_turn: u32, log: TranscriptLog) -> Self {
        Self {
            turns,
            words_per_turn,
            log,
            seeds: SeedSource::from_entropy(),
            checkpoint: None,
            callback: None,
        }
    }

    /// Set a callback for debate events.
    pub fn with_callback(mut self, callback: DebateCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Persist the partial transcript here after every utterance.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    pub fn with_seed_source(mut self, seeds: SeedSource) -> Self {
        self.seeds = seeds;
        self
    }

    /// The next step to run, or `None` when the debate is complete.
    pub fn next_step(&self) -> Option<DebateStep> {
        schedule(self.log.rounds()).get(self.log.len()).copied()
    }

    /// Run the remaining steps of the debate.
    ///
    /// On failure every utterance committed so far stays available through
    /// [`transcript`](Self::transcript) and in the checkpoint file.
    pub async fn run(&mut self) -> Result<Transcript, DebateError> {
        if !self.log.is_empty() {
            info!(
                completed = self.log.len(),
                total = Transcript::expected_len(self.log.rounds()),
                "resuming debate"
            );
        }

        while let Some(step) = self.next_step() {
            if let Err(e) = self.run_step(step).await {
                warn!(
                    ?step,
                    completed = self.log.len(),
                    error = %e,
                    "debate turn failed, keeping partial transcript"
                );
                return Err(e);
            }
        }

        self.emit_event(DebateEvent::DebateEnd);
        Ok(self.log.snapshot())
    }

    async fn run_step(&mut self, step: DebateStep) -> Result<(), DebateError> {
        let rounds = self.log.rounds();
        let round = step.round(rounds);
        let role = step.role();
        let speaker = self.log.names().get(role).to_string();

        self.emit_event(DebateEvent::StepStart {
            step,
            speaker: speaker.clone(),
            round,
        });

        let (system, user) = self.prompts_for(step);
        let seed = role.is_debater().then(|| self.seeds.draw());
        info!(round, role = %role, ?seed, "generating turn");

        let text = self.turns.generate_turn(&system, &user, seed).await?;

        let mut utterance = Utterance::new(speaker, role, text, round);
        if role.is_debater() {
            utterance = utterance.with_approx_words(self.words_per_turn);
        }
        self.log.append(utterance.clone());
        self.emit_event(DebateEvent::Spoken { utterance });

        // Checkpoint failures are fatal; the utterance stays committed.
        self.write_checkpoint()
    }

    /// System and user prompts for a step.
    fn prompts_for(&self, step: DebateStep) -> (String, String) {
        let words = self.words_per_turn;
        let topic = self.log.topic();
        let names = self.log.names();

        match step {
            DebateStep::Opening => (
                PromptTemplate::ModeratorSystem.render(words),
                prompts::opening_prompt(words, topic, &names.debater_a, &names.debater_b),
            ),
            DebateStep::DebaterA(r) => (
                PromptTemplate::DebaterASystem.render(words),
                self.with_opponent(
                    prompts::debater_a_prompt(r, topic, words),
                    Role::DebaterB,
                ),
            ),
            DebateStep::DebaterB(r) => (
                PromptTemplate::DebaterBSystem.render(words),
                self.with_opponent(
                    prompts::debater_b_prompt(r, topic, words),
                    Role::DebaterA,
                ),
            ),
            DebateStep::CrossExam(r) => (
                PromptTemplate::ModeratorSystem.render(words),
                prompts::cross_exam_prompt(words, r),
            ),
            DebateStep::Closing => (
                PromptTemplate::ModeratorSystem.render(words),
                prompts::closing_prompt(words, &names.debater_a, &names.debater_b),
            ),
        }
    }

    /// Append the opponent's latest statement, if they have spoken yet.
    fn with_opponent(&self, prompt: String, opponent: Role) -> String {
        match self
            .log
            .utterances()
            .iter()
            .rev()
            .find(|u| u.role == opponent)
        {
            Some(last) => format!("{}\n\n[Opponent {} said]: {}", prompt, last.speaker, last.text),
            None => prompt,
        }
    }

    fn write_checkpoint(&self) -> Result<(), DebateError> {
        let Some(path) = &self.checkpoint else {
            return Ok(());
        };
        self.log.snapshot().save_json(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to write transcript checkpoint");
            e
        })
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: DebateEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    /// Snapshot of the transcript so far.
    pub fn transcript(&self) -> Transcript {
        self.log.snapshot()
    }

    /// Utterances committed so far.
    pub fn utterances(&self) -> &[Utterance] {
        self.log.utterances()
    }
}
