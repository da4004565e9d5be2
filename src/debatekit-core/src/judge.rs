//! Model-based judging of a finished transcript.
//!
//! A [`JudgeRunner`] performs one scoring pass; a [`JudgePanel`] runs N of
//! them with varied personas and seeds. Judge output is parsed against a
//! strict schema; anything that does not fit becomes a
//! [`VerdictOutcome::Malformed`] verdict instead of an error, so one bad judge
//! never takes the panel down.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::backend::{CallPolicy, ChatRequest, ModelBackend};
use crate::seed::SeedSource;
use crate::transcript::{Role, RoleNames, Transcript};
use crate::turn::strip_reasoning;

/// Sampling temperature for judge passes.
pub const JUDGE_TEMPERATURE: f32 = 0.7;

/// Word budget for a judge's rationale.
pub const RATIONALE_WORD_LIMIT: usize = 120;

pub const MAX_SCORE: i64 = 100;

/// Judge personas, assigned round-robin by judge index.
pub const PERSONAS: [&str; 9] = [
    "Focus on logical rigor and structure.",
    "Focus on use of concrete evidence and citations.",
    "Focus on addressing opponent arguments (steelman).",
    "Focus on clarity and pedagogy.",
    "Focus on breadth and coverage of relevant angles.",
    "Focus on tone, neutrality and fairness.",
    "Focus on self-consistency and lack of contradictions.",
    "Focus on persuasiveness for an undecided audience.",
    "Focus on factuality and accuracy.",
];

const JUDGE_SYSTEM_PREFIX: &str = "You are a fair, independent judge. ";

const JUDGE_PROMPT: &str = r#"You are a meticulous impartial judge scoring a formal debate.
Evaluate the debate overall, across ALL rounds, using the following 10 criteria:
logic, evidence, counterargument, clarity, sources, breadth, neutrality, consistency, persuasion, accuracy.
Return STRICT JSON of the form {"criteria": {"logic": 0, ...}, "rationale": "...", "winner": "..."}
with integer scores 0-100 for each criterion, a short 'rationale', and 'winner' among {a} or {b}.
Keep rationale under {limit} words. Think step-by-step but only output JSON.
"#;

/// The ten fixed scoring criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Logic,
    Evidence,
    Counterargument,
    Clarity,
    Sources,
    Breadth,
    Neutrality,
    Consistency,
    Persuasion,
    Accuracy,
}

impl Criterion {
    pub const ALL: [Criterion; 10] = [
        Criterion::Logic,
        Criterion::Evidence,
        Criterion::Counterargument,
        Criterion::Clarity,
        Criterion::Sources,
        Criterion::Breadth,
        Criterion::Neutrality,
        Criterion::Consistency,
        Criterion::Persuasion,
        Criterion::Accuracy,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Criterion::Logic => "logic",
            Criterion::Evidence => "evidence",
            Criterion::Counterargument => "counterargument",
            Criterion::Clarity => "clarity",
            Criterion::Sources => "sources",
            Criterion::Breadth => "breadth",
            Criterion::Neutrality => "neutrality",
            Criterion::Consistency => "consistency",
            Criterion::Persuasion => "persuasion",
            Criterion::Accuracy => "accuracy",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A judge output that fit the expected structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Only scores that were integers in `0..=100`.
    pub criteria: BTreeMap<Criterion, u8>,
    #[serde(default)]
    pub winner: Option<Role>,
    #[serde(default)]
    pub rationale: String,
}

/// A judge output that could not be used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalformedOutput {
    /// `invalid_json`, `missing_criteria`, `backend_error` or `judge_task_failed`.
    pub error: String,
    pub raw: String,
}

impl MalformedOutput {
    pub fn new(error: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw: raw.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerdictOutcome {
    Scored(ScoreCard),
    Malformed(MalformedOutput),
}

/// One judging pass, tagged with the seed and persona that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    #[serde(rename = "_seed")]
    pub seed: i64,
    #[serde(rename = "_persona")]
    pub persona: String,
    #[serde(flatten)]
    pub outcome: VerdictOutcome,
}

impl JudgeVerdict {
    pub fn scored(seed: i64, persona: impl Into<String>, card: ScoreCard) -> Self {
        Self {
            seed,
            persona: persona.into(),
            outcome: VerdictOutcome::Scored(card),
        }
    }

    pub fn malformed(seed: i64, persona: impl Into<String>, output: MalformedOutput) -> Self {
        Self {
            seed,
            persona: persona.into(),
            outcome: VerdictOutcome::Malformed(output),
        }
    }

    pub fn score_card(&self) -> Option<&ScoreCard> {
        match &self.outcome {
            VerdictOutcome::Scored(card) => Some(card),
            VerdictOutcome::Malformed(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.score_card().is_some()
    }

    pub fn winner(&self) -> Option<Role> {
        self.score_card().and_then(|card| card.winner)
    }

    pub fn score(&self, criterion: Criterion) -> Option<u8> {
        self.score_card()
            .and_then(|card| card.criteria.get(&criterion).copied())
    }
}

/// Build the rubric for a transcript's two debaters.
pub fn rubric(names: &RoleNames) -> String {
    JUDGE_PROMPT
        .replace("{a}", &names.debater_a)
        .replace("{b}", &names.debater_b)
        .replace("{limit}", &RATIONALE_WORD_LIMIT.to_string())
}

/// Parse one judge response against the verdict schema.
pub fn parse_verdict(raw: &str, names: &RoleNames) -> Result<ScoreCard, MalformedOutput> {
    let answer = strip_reasoning(raw);
    let value: Value = serde_json::from_str(strip_code_fence(&answer))
        .map_err(|_| MalformedOutput::new("invalid_json", raw))?;
    let Value::Object(root) = value else {
        return Err(MalformedOutput::new("invalid_json", raw));
    };

    let scores = match root.get("criteria") {
        Some(Value::Object(criteria)) => criteria,
        Some(_) => return Err(MalformedOutput::new("missing_criteria", raw)),
        // Some models put the criteria at the top level.
        None if Criterion::ALL.iter().any(|c| root.contains_key(c.key())) => &root,
        None => return Err(MalformedOutput::new("missing_criteria", raw)),
    };

    let criteria = Criterion::ALL
        .iter()
        .filter_map(|&criterion| valid_score(scores, criterion).map(|score| (criterion, score)))
        .collect();

    let winner = match root.get("winner") {
        Some(Value::String(name)) => {
            let resolved = resolve_winner(name, names);
            if resolved.is_none() {
                warn!(winner = %name, "judge named an unknown winner");
            }
            resolved
        }
        _ => None,
    };

    let rationale = root
        .get("rationale")
        .and_then(Value::as_str)
        .map(|text| truncate_words(text, RATIONALE_WORD_LIMIT))
        .unwrap_or_default();

    Ok(ScoreCard {
        criteria,
        winner,
        rationale,
    })
}

fn valid_score(scores: &Map<String, Value>, criterion: Criterion) -> Option<u8> {
    let value = scores.get(criterion.key())?;
    match value.as_i64() {
        Some(score) if (0..=MAX_SCORE).contains(&score) => Some(score as u8),
        _ => {
            warn!(criterion = %criterion, value = %value, "dropping invalid judge score");
            None
        }
    }
}

/// Map a declared winner onto a debater role.
pub fn resolve_winner(declared: &str, names: &RoleNames) -> Option<Role> {
    let declared = declared.trim();
    let matches = |role: Role, name: &str, letter: &str| {
        declared.eq_ignore_ascii_case(name)
            || declared.eq_ignore_ascii_case(role.key())
            || declared.eq_ignore_ascii_case(letter)
            || declared.eq_ignore_ascii_case(&format!("debater {letter}"))
    };

    if matches(Role::DebaterA, &names.debater_a, "a") {
        Some(Role::DebaterA)
    } else if matches(Role::DebaterB, &names.debater_b, "b") {
        Some(Role::DebaterB)
    } else {
        None
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|body| body.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        text.trim().to_string()
    } else {
        words[..limit].join(" ")
    }
}

/// Executes one scoring pass against the model backend.
#[derive(Clone)]
pub struct JudgeRunner {
    backend: Arc<dyn ModelBackend>,
    model: String,
    policy: CallPolicy,
}

impl JudgeRunner {
    pub fn new(backend: Arc<dyn ModelBackend>, model: impl Into<String>, policy: CallPolicy) -> Self {
        Self {
            backend,
            model: model.into(),
            policy,
        }
    }

    /// Score a transcript. Failures come back as malformed verdicts.
    pub async fn score_transcript(
        &self,
        transcript: &Transcript,
        seed: i64,
        persona: &str,
    ) -> JudgeVerdict {
        let request = ChatRequest {
            model: self.model.clone(),
            system: format!("{JUDGE_SYSTEM_PREFIX}{persona}"),
            user: format!(
                "{}\n\n{}",
                rubric(&transcript.names),
                transcript.render_judge_context()
            ),
            temperature: JUDGE_TEMPERATURE,
            seed: Some(seed),
            json_output: true,
        };

        let raw = match self
            .policy
            .complete(self.backend.as_ref(), "judge", &request)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(seed, error = %e, "judge call failed");
                return JudgeVerdict::malformed(
                    seed,
                    persona,
                    MalformedOutput::new("backend_error", e.to_string()),
                );
            }
        };

        match parse_verdict(&raw, &transcript.names) {
            Ok(card) => JudgeVerdict::scored(seed, persona, card),
            Err(malformed) => {
                warn!(seed, error = %malformed.error, "judge returned malformed output");
                JudgeVerdict::malformed(seed, persona, malformed)
            }
        }
    }
}

/// How seeds are assigned across a panel.
#[derive(Debug, Clone)]
pub enum SeedPlan {
    /// A distinct random seed per judge.
    Varied(SeedSource),
    /// The same seed for every judge.
    Fixed(i64),
}

impl SeedPlan {
    pub fn seeds(&mut self, count: usize) -> Vec<i64> {
        match self {
            SeedPlan::Varied(source) => source.draw_distinct(count),
            SeedPlan::Fixed(seed) => vec![*seed; count],
        }
    }
}

/// N independent judges over one immutable transcript.
pub struct JudgePanel {
    runner: JudgeRunner,
    count: usize,
    seeds: SeedPlan,
    concurrency: usize,
}

impl JudgePanel {
    pub fn new(runner: JudgeRunner, count: usize, seeds: SeedPlan) -> Self {
        Self {
            runner,
            count,
            seeds,
            concurrency: 1,
        }
    }

    /// Allow up to `limit` judge calls in flight.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn persona(index: usize) -> &'static str {
        PERSONAS[index % PERSONAS.len()]
    }

    /// Run every judge. The result is in judge order and always has `count` entries.
    pub async fn run(&mut self, transcript: Arc<Transcript>) -> Vec<JudgeVerdict> {
        let seeds = self.seeds.seeds(self.count);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();

        for (index, &seed) in seeds.iter().enumerate() {
            let runner = self.runner.clone();
            let transcript = Arc::clone(&transcript);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let verdict = runner
                    .score_transcript(&transcript, seed, Self::persona(index))
                    .await;
                (index, verdict)
            });
        }

        let mut slots: Vec<Option<JudgeVerdict>> = vec![None; seeds.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, verdict)) => {
                    info!(
                        judge = index,
                        seed = verdict.seed,
                        valid = verdict.is_valid(),
                        "judge finished"
                    );
                    slots[index] = Some(verdict);
                }
                Err(e) => warn!(error = %e, "judge task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(seeds)
            .enumerate()
            .map(|(index, (slot, seed))| {
                slot.unwrap_or_else(|| {
                    JudgeVerdict::malformed(
                        seed,
                        Self::persona(index),
                        MalformedOutput::new("judge_task_failed", String::new()),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;
    use crate::backend::testing::{FakeBackend, quick_policy};
    use crate::error::DebateError;
    use crate::transcript::{TranscriptLog, Utterance};
    use async_trait::async_trait;

    fn names() -> RoleNames {
        RoleNames::new("Alice", "Bob", "Mod")
    }

    fn transcript() -> Arc<Transcript> {
        let mut log = TranscriptLog::new("X", 1, names());
        log.append(Utterance::new("Mod", Role::Moderator, "Welcome.", 0));
        log.append(Utterance::new("Alice", Role::DebaterA, "For.", 1));
        log.append(Utterance::new("Bob", Role::DebaterB, "Against.", 1));
        log.append(Utterance::new("Mod", Role::Moderator, "Questions?", 1));
        log.append(Utterance::new("Mod", Role::Moderator, "Thanks.", 2));
        Arc::new(log.finish())
    }

    fn full_json(winner: &str, score: i64) -> String {
        let criteria: Map<String, Value> = Criterion::ALL
            .iter()
            .map(|c| (c.key().to_string(), Value::from(score)))
            .collect();
        serde_json::json!({
            "criteria": criteria,
            "rationale": "Clear structure.",
            "winner": winner,
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_verdict() {
        let card = parse_verdict(&full_json("Alice", 80), &names()).unwrap();
        assert_eq!(card.criteria.len(), 10);
        assert_eq!(card.criteria[&Criterion::Logic], 80);
        assert_eq!(card.winner, Some(Role::DebaterA));
        assert_eq!(card.rationale, "Clear structure.");
    }

    #[test]
    fn test_parse_invalid_json_keeps_raw() {
        let err = parse_verdict("The winner is clearly Bob.", &names()).unwrap_err();
        assert_eq!(err.error, "invalid_json");
        assert_eq!(err.raw, "The winner is clearly Bob.");

        let err = parse_verdict("[1, 2, 3]", &names()).unwrap_err();
        assert_eq!(err.error, "invalid_json");
    }

    #[test]
    fn test_parse_missing_criteria() {
        let err = parse_verdict(r#"{"winner": "Bob"}"#, &names()).unwrap_err();
        assert_eq!(err.error, "missing_criteria");

        let err = parse_verdict(r#"{"criteria": [80, 70], "winner": "Bob"}"#, &names()).unwrap_err();
        assert_eq!(err.error, "missing_criteria");
    }

    #[test]
    fn test_parse_drops_out_of_range_and_non_integer_scores() {
        let raw = r#"{"criteria": {"logic": 101, "evidence": -1, "clarity": 72.5,
                     "sources": "90", "breadth": 55}, "winner": "Bob"}"#;
        let card = parse_verdict(raw, &names()).unwrap();
        assert_eq!(card.criteria.len(), 1);
        assert_eq!(card.criteria[&Criterion::Breadth], 55);
        assert_eq!(card.winner, Some(Role::DebaterB));
    }

    #[test]
    fn test_parse_top_level_criteria_and_code_fence() {
        let raw = "```json\n{\"logic\": 60, \"accuracy\": 90, \"winner\": \"debater_b\"}\n```";
        let card = parse_verdict(raw, &names()).unwrap();
        assert_eq!(card.criteria[&Criterion::Logic], 60);
        assert_eq!(card.criteria[&Criterion::Accuracy], 90);
        assert_eq!(card.winner, Some(Role::DebaterB));
    }

    #[test]
    fn test_parse_skips_leading_reasoning_block() {
        let raw = format!("<think>Alice argued better.</think>\n{}", full_json("Alice", 65));
        let card = parse_verdict(&raw, &names()).unwrap();
        assert_eq!(card.criteria[&Criterion::Counterargument], 65);
        assert_eq!(card.winner, Some(Role::DebaterA));

        let err = parse_verdict("<think>hmm</think>", &names()).unwrap_err();
        assert_eq!(err.error, "invalid_json");
        assert_eq!(err.raw, "<think>hmm</think>");
    }

    #[test]
    fn test_resolve_winner_variants() {
        let names = names();
        assert_eq!(resolve_winner("alice", &names), Some(Role::DebaterA));
        assert_eq!(resolve_winner(" Bob ", &names), Some(Role::DebaterB));
        assert_eq!(resolve_winner("Debater A", &names), Some(Role::DebaterA));
        assert_eq!(resolve_winner("B", &names), Some(Role::DebaterB));
        assert_eq!(resolve_winner("Mod", &names), None);
        assert_eq!(resolve_winner("tie", &names), None);
    }

    #[test]
    fn test_rationale_is_bounded() {
        let long = "word ".repeat(300);
        let raw = serde_json::json!({"criteria": {"logic": 50}, "rationale": long}).to_string();
        let card = parse_verdict(&raw, &names()).unwrap();
        assert_eq!(card.rationale.split_whitespace().count(), RATIONALE_WORD_LIMIT);
        assert_eq!(card.winner, None);
    }

    #[test]
    fn test_verdict_document_shape() {
        let valid = JudgeVerdict::scored(
            7,
            PERSONAS[0],
            parse_verdict(&full_json("Bob", 70), &names()).unwrap(),
        );
        let json = serde_json::to_value(&valid).unwrap();
        assert_eq!(json["_seed"], 7);
        assert_eq!(json["_persona"], PERSONAS[0]);
        assert_eq!(json["winner"], "debater_b");
        assert_eq!(json["criteria"]["persuasion"], 70);

        let malformed =
            JudgeVerdict::malformed(9, PERSONAS[1], MalformedOutput::new("invalid_json", "oops"));
        let json = serde_json::to_value(&malformed).unwrap();
        assert_eq!(json["error"], "invalid_json");
        assert_eq!(json["raw"], "oops");

        let back: JudgeVerdict = serde_json::from_value(json).unwrap();
        assert_eq!(back, malformed);
        let back: JudgeVerdict = serde_json::from_value(serde_json::to_value(&valid).unwrap()).unwrap();
        assert_eq!(back, valid);
    }

    #[tokio::test]
    async fn test_runner_sends_rubric_and_context() {
        let backend = Arc::new(FakeBackend::new(|_, _| Ok(full_json("Alice", 90))));
        let runner = JudgeRunner::new(backend.clone(), "judge-model", quick_policy(1));
        let verdict = runner.score_transcript(&transcript(), 55, PERSONAS[3]).await;

        assert!(verdict.is_valid());
        assert_eq!(verdict.seed, 55);
        assert_eq!(verdict.persona, PERSONAS[3]);

        let request = &backend.requests()[0];
        assert_eq!(request.model, "judge-model");
        assert_eq!(request.temperature, JUDGE_TEMPERATURE);
        assert_eq!(request.seed, Some(55));
        assert!(request.json_output);
        assert!(request.system.ends_with(PERSONAS[3]));
        assert!(request.user.contains("'winner' among Alice or Bob"));
        assert!(request.user.contains("[debater_b|Bob|round 1] Against."));
    }

    #[tokio::test]
    async fn test_runner_turns_backend_error_into_malformed_verdict() {
        let backend = Arc::new(FakeBackend::new(|_, _| {
            Err(DebateError::Timeout(Duration::from_secs(1)))
        }));
        let runner = JudgeRunner::new(backend, "m", quick_policy(1));
        let verdict = runner.score_transcript(&transcript(), 1, PERSONAS[0]).await;

        match verdict.outcome {
            VerdictOutcome::Malformed(output) => assert_eq!(output.error, "backend_error"),
            VerdictOutcome::Scored(_) => panic!("expected malformed verdict"),
        }
        assert_eq!(verdict.seed, 1);
    }

    #[tokio::test]
    async fn test_panel_of_nine_gets_distinct_seeds() {
        let backend = Arc::new(FakeBackend::new(|_, _| Ok(full_json("Alice", 75))));
        let runner = JudgeRunner::new(backend.clone(), "m", quick_policy(1));
        let mut panel = JudgePanel::new(runner, 9, SeedPlan::Varied(SeedSource::seeded(11)));

        let verdicts = panel.run(transcript()).await;
        assert_eq!(verdicts.len(), 9);

        let seeds: HashSet<i64> = verdicts.iter().map(|v| v.seed).collect();
        assert_eq!(seeds.len(), 9);
        let sent: HashSet<i64> = backend.requests().iter().filter_map(|r| r.seed).collect();
        assert_eq!(sent, seeds);

        for (index, verdict) in verdicts.iter().enumerate() {
            assert_eq!(verdict.persona, PERSONAS[index]);
        }
    }

    #[tokio::test]
    async fn test_panel_fixed_seed() {
        let backend = Arc::new(FakeBackend::new(|_, _| Ok(full_json("Bob", 75))));
        let runner = JudgeRunner::new(backend, "m", quick_policy(1));
        let mut panel = JudgePanel::new(runner, 3, SeedPlan::Fixed(42));

        let verdicts = panel.run(transcript()).await;
        assert!(verdicts.iter().all(|v| v.seed == 42));
    }

    #[tokio::test]
    async fn test_panel_isolates_failing_judges() {
        // Every third call fails outright; every call whose index is 1 mod 3 is garbage.
        let backend = Arc::new(FakeBackend::new(|n, _| match n % 3 {
            0 => Err(DebateError::Timeout(Duration::from_secs(1))),
            1 => Ok("not json".to_string()),
            _ => Ok(full_json("Alice", 60)),
        }));
        let runner = JudgeRunner::new(backend, "m", quick_policy(1));
        let mut panel = JudgePanel::new(runner, 10, SeedPlan::Varied(SeedSource::seeded(5)))
            .with_concurrency(4);

        let verdicts = panel.run(transcript()).await;
        assert_eq!(verdicts.len(), 10);
        let valid = verdicts.iter().filter(|v| v.is_valid()).count();
        assert_eq!(valid, 3);
        for (index, verdict) in verdicts.iter().enumerate() {
            assert_eq!(verdict.persona, JudgePanel::persona(index));
        }
        assert_eq!(verdicts[9].persona, PERSONAS[0]);
    }

    /// Later judges answer first: the delay shrinks with the judge index.
    struct ReversedBackend;

    #[async_trait]
    impl ModelBackend for ReversedBackend {
        async fn complete(&self, request: ChatRequest) -> Result<String, DebateError> {
            let index = PERSONAS
                .iter()
                .position(|persona| request.system.ends_with(persona))
                .unwrap_or(0);
            let delay = 10 * (PERSONAS.len() - index) as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(full_json("Bob", 50 + index as i64))
        }
    }

    #[tokio::test]
    async fn test_panel_keeps_judge_order_when_finishing_out_of_order() {
        let runner = JudgeRunner::new(Arc::new(ReversedBackend), "m", quick_policy(1));
        let mut panel = JudgePanel::new(runner, 9, SeedPlan::Varied(SeedSource::seeded(3)))
            .with_concurrency(9);

        let verdicts = panel.run(transcript()).await;
        let expected_seeds = SeedSource::seeded(3).draw_distinct(9);
        assert_eq!(verdicts.len(), 9);
        for (index, verdict) in verdicts.iter().enumerate() {
            assert_eq!(verdict.persona, PERSONAS[index]);
            assert_eq!(verdict.seed, expected_seeds[index]);
            assert_eq!(verdict.score(Criterion::Logic), Some(50 + index as u8));
        }
    }
}
