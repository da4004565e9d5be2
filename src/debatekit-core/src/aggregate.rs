//! Combine a judge panel's verdicts into one decision.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DebateError;
use crate::judge::{Criterion, JudgeVerdict};
use crate::transcript::{JUDGE_CONTEXT_VERSION, Role, write_json_atomic};

/// Derived panel decision. Never persisted without its source verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateVerdict {
    /// Plurality winner; `None` when no verdict named one.
    pub winner: Option<Role>,
    /// Mean valid score per criterion; `None` when no judge supplied one.
    pub averages: BTreeMap<Criterion, Option<f64>>,
    /// Panel size, malformed verdicts included.
    pub count: usize,
    /// Verdicts that parsed.
    pub valid: usize,
}

/// Reduce verdicts to a plurality winner and per-criterion means.
///
/// The result depends only on the multiset of verdicts, never their order.
/// Ties go to the smallest role key, so `debater_a` beats `debater_b` on
/// equal votes.
pub fn aggregate(verdicts: &[JudgeVerdict]) -> AggregateVerdict {
    AggregateVerdict {
        winner: plurality_winner(verdicts),
        averages: criterion_averages(verdicts),
        count: verdicts.len(),
        valid: verdicts.iter().filter(|v| v.is_valid()).count(),
    }
}

fn plurality_winner(verdicts: &[JudgeVerdict]) -> Option<Role> {
    let mut votes: BTreeMap<Role, usize> = BTreeMap::new();
    for role in verdicts.iter().filter_map(JudgeVerdict::winner) {
        *votes.entry(role).or_default() += 1;
    }

    // Ascending role order; only a strictly higher count displaces the leader.
    let mut leader: Option<(Role, usize)> = None;
    for (role, count) in votes {
        if leader.is_none_or(|(_, best)| count > best) {
            leader = Some((role, count));
        }
    }
    leader.map(|(role, _)| role)
}

fn criterion_averages(verdicts: &[JudgeVerdict]) -> BTreeMap<Criterion, Option<f64>> {
    Criterion::ALL
        .iter()
        .map(|&criterion| {
            let (sum, n) = verdicts
                .iter()
                .filter_map(|v| v.score(criterion))
                .fold((0u64, 0u64), |(sum, n), score| (sum + u64::from(score), n + 1));
            let mean = (n > 0).then(|| sum as f64 / n as f64);
            (criterion, mean)
        })
        .collect()
}

/// The `scores.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Every verdict in judge order, malformed ones included.
    pub judges_raw: Vec<JudgeVerdict>,
    pub aggregate: AggregateVerdict,
    /// Layout version of the transcript context the judges saw.
    #[serde(default = "default_context_version")]
    pub context_version: u32,
}

fn default_context_version() -> u32 {
    JUDGE_CONTEXT_VERSION
}

impl ScoreReport {
    pub fn new(judges_raw: Vec<JudgeVerdict>) -> Self {
        let aggregate = aggregate(&judges_raw);
        Self {
            judges_raw,
            aggregate,
            context_version: JUDGE_CONTEXT_VERSION,
        }
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), DebateError> {
        write_json_atomic(path.as_ref(), self)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{MalformedOutput, ScoreCard};

    fn verdict(winner: Option<Role>, scores: &[(Criterion, u8)]) -> JudgeVerdict {
        JudgeVerdict::scored(
            1,
            "persona",
            ScoreCard {
                criteria: scores.iter().copied().collect(),
                winner,
                rationale: String::new(),
            },
        )
    }

    fn malformed() -> JudgeVerdict {
        JudgeVerdict::malformed(2, "persona", MalformedOutput::new("invalid_json", "???"))
    }

    #[test]
    fn test_plurality_winner() {
        let verdicts = vec![
            verdict(Some(Role::DebaterA), &[]),
            verdict(Some(Role::DebaterA), &[]),
            verdict(Some(Role::DebaterB), &[]),
        ];
        assert_eq!(aggregate(&verdicts).winner, Some(Role::DebaterA));

        let verdicts = vec![
            verdict(Some(Role::DebaterB), &[]),
            verdict(Some(Role::DebaterA), &[]),
            verdict(Some(Role::DebaterB), &[]),
        ];
        assert_eq!(aggregate(&verdicts).winner, Some(Role::DebaterB));
    }

    #[test]
    fn test_tie_goes_to_smallest_role_key() {
        let ab = vec![
            verdict(Some(Role::DebaterA), &[]),
            verdict(Some(Role::DebaterB), &[]),
        ];
        let ba = vec![
            verdict(Some(Role::DebaterB), &[]),
            verdict(Some(Role::DebaterA), &[]),
        ];
        assert_eq!(aggregate(&ab).winner, Some(Role::DebaterA));
        assert_eq!(aggregate(&ba).winner, Some(Role::DebaterA));
    }

    #[test]
    fn test_exact_mean_and_missing_criterion() {
        let verdicts = vec![
            verdict(None, &[(Criterion::Logic, 70), (Criterion::Evidence, 0)]),
            verdict(None, &[(Criterion::Logic, 75)]),
            verdict(None, &[(Criterion::Logic, 81)]),
        ];
        let result = aggregate(&verdicts);
        assert_eq!(result.averages[&Criterion::Logic], Some(226.0 / 3.0));
        assert_eq!(result.averages[&Criterion::Evidence], Some(0.0));
        assert_eq!(result.averages[&Criterion::Accuracy], None);
        assert_eq!(result.averages.len(), 10);
        assert_eq!(result.winner, None);
    }

    #[test]
    fn test_malformed_verdicts_are_ignored_but_counted() {
        let valid = vec![
            verdict(Some(Role::DebaterB), &[(Criterion::Clarity, 90)]),
            verdict(Some(Role::DebaterA), &[(Criterion::Clarity, 60)]),
            verdict(Some(Role::DebaterB), &[(Criterion::Clarity, 30)]),
        ];
        let mut mixed = valid.clone();
        mixed.insert(1, malformed());
        mixed.push(malformed());
        mixed.insert(0, malformed());

        let clean = aggregate(&valid);
        let noisy = aggregate(&mixed);
        assert_eq!(noisy.winner, clean.winner);
        assert_eq!(noisy.averages, clean.averages);
        assert_eq!(noisy.count, 6);
        assert_eq!(noisy.valid, 3);
    }

    #[test]
    fn test_all_malformed_yields_empty_aggregate() {
        let verdicts = vec![malformed(), malformed(), malformed()];
        let result = aggregate(&verdicts);
        assert_eq!(result.winner, None);
        assert!(result.averages.values().all(Option::is_none));
        assert_eq!(result.count, 3);
        assert_eq!(result.valid, 0);

        let empty = aggregate(&[]);
        assert_eq!(empty.winner, None);
        assert_eq!(empty.count, 0);
    }

    #[test]
    fn test_permutation_does_not_change_result() {
        let mut verdicts = vec![
            verdict(Some(Role::DebaterA), &[(Criterion::Logic, 33), (Criterion::Sources, 10)]),
            verdict(Some(Role::DebaterB), &[(Criterion::Logic, 67)]),
            malformed(),
            verdict(Some(Role::DebaterB), &[(Criterion::Logic, 99), (Criterion::Sources, 45)]),
            verdict(Some(Role::DebaterA), &[(Criterion::Breadth, 12)]),
            verdict(None, &[(Criterion::Logic, 1)]),
        ];
        let expected = aggregate(&verdicts);

        // Every rotation and the reversal of each.
        for _ in 0..verdicts.len() {
            verdicts.rotate_left(1);
            assert_eq!(aggregate(&verdicts), expected);
            let mut reversed = verdicts.clone();
            reversed.reverse();
            assert_eq!(aggregate(&reversed), expected);
        }
    }

    #[test]
    fn test_score_report_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let report = ScoreReport::new(vec![
            verdict(Some(Role::DebaterB), &[(Criterion::Logic, 80)]),
            malformed(),
        ]);
        report.save_json(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["judges_raw"].as_array().unwrap().len(), 2);
        assert_eq!(raw["judges_raw"][1]["error"], "invalid_json");
        assert_eq!(raw["aggregate"]["winner"], "debater_b");
        assert_eq!(raw["aggregate"]["averages"]["logic"], 80.0);
        assert!(raw["aggregate"]["averages"]["accuracy"].is_null());
        assert_eq!(raw["aggregate"]["count"], 2);

        assert_eq!(ScoreReport::load_json(&path).unwrap(), report);
    }
}
