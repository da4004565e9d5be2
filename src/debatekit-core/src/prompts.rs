//! Instruction templates for every speaking role and phase.
//!
//! Each template carries a `{words}` placeholder for the configured target
//! turn length. Topic and speaker names are appended by the orchestrator,
//! not baked into the templates.

const SYSTEM_MODERATOR: &str = "You are a strict debate moderator. Enforce turn-taking, keep answers concise, and avoid repetition. Each debater response should be around {words} words. Keep debate civil and on-topic, and do not invent facts.";

const SYSTEM_DEBATER_A: &str = "You are Debater A. You strongly advocate FOR the topic. Be persuasive and structured. Cite examples where possible. Avoid repeating yourself. Aim for ~{words} words per turn.";

const SYSTEM_DEBATER_B: &str = "You are Debater B. You strongly argue AGAINST the topic. Be persuasive and structured. Address the opponent's strongest points (steelman). Avoid repetition. Aim for ~{words} words per turn.";

const MODERATOR_OPEN: &str = "Open the debate with a 2-3 sentence overview of the topic and the rules. Announce each speaker's name. Keep it under {words} words.";

const MODERATOR_CROSS: &str = "Briefly transition to the cross-examination phase for this round. Ask one pointed question to each side, no more than {words} words total.";

const MODERATOR_CLOSE: &str = "Close the debate in 2-3 sentences. Summarize the main clash without picking a winner. Stay under {words} words.";

const PLACEHOLDER: &str = "{words}";

/// One of the fixed role/phase instruction strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    ModeratorSystem,
    DebaterASystem,
    DebaterBSystem,
    ModeratorOpening,
    ModeratorCrossExam,
    ModeratorClosing,
}

impl PromptTemplate {
    pub const ALL: [PromptTemplate; 6] = [
        PromptTemplate::ModeratorSystem,
        PromptTemplate::DebaterASystem,
        PromptTemplate::DebaterBSystem,
        PromptTemplate::ModeratorOpening,
        PromptTemplate::ModeratorCrossExam,
        PromptTemplate::ModeratorClosing,
    ];

    /// The raw template text, placeholder included.
    pub fn template(&self) -> &'static str {
        match self {
            PromptTemplate::ModeratorSystem => SYSTEM_MODERATOR,
            PromptTemplate::DebaterASystem => SYSTEM_DEBATER_A,
            PromptTemplate::DebaterBSystem => SYSTEM_DEBATER_B,
            PromptTemplate::ModeratorOpening => MODERATOR_OPEN,
            PromptTemplate::ModeratorCrossExam => MODERATOR_CROSS,
            PromptTemplate::ModeratorClosing => MODERATOR_CLOSE,
        }
    }

    /// Produce the literal instruction text for a target word count.
    pub fn render(&self, words: u32) -> String {
        let template = self.template();
        debug_assert!(
            template.contains(PLACEHOLDER),
            "template {:?} has no {} placeholder",
            self,
            PLACEHOLDER
        );
        template.replace(PLACEHOLDER, &words.to_string())
    }
}

/// User prompt for the moderator's opening.
pub fn opening_prompt(words: u32, topic: &str, debater_a: &str, debater_b: &str) -> String {
    format!(
        "{}\n\nTopic: {}\nDebaters: {} (Pro) vs {} (Con)",
        PromptTemplate::ModeratorOpening.render(words),
        topic,
        debater_a,
        debater_b
    )
}

/// User prompt for Debater A's turn in a round.
pub fn debater_a_prompt(round: u32, topic: &str, words: u32) -> String {
    format!("Round {round}. Topic: {topic}. Approximately {words} words.")
}

/// User prompt for Debater B's turn, which must answer Debater A.
pub fn debater_b_prompt(round: u32, topic: &str, words: u32) -> String {
    format!("Round {round}. Topic: {topic}. Respond to Debater A. Approximately {words} words.")
}

/// User prompt for the moderator's cross-examination at the end of a round.
pub fn cross_exam_prompt(words: u32, round: u32) -> String {
    format!(
        "{}\nRound {}. Keep it short.",
        PromptTemplate::ModeratorCrossExam.render(words),
        round
    )
}

/// User prompt for the moderator's non-partisan closing.
pub fn closing_prompt(words: u32, debater_a: &str, debater_b: &str) -> String {
    format!(
        "{}\nThank {} and {}.",
        PromptTemplate::ModeratorClosing.render(words),
        debater_a,
        debater_b
    )
}
