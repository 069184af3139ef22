//! Stability of answers and reasoning paths when only the framing of a
//! comparison question changes.
//!
//! Input records carry `group_id`, `framing_id`, `prediction`,
//! `golden_answers` and the `path_label` computed for that framing. All
//! records sharing a `group_id` are framings of the same question.

use indexmap::IndexMap;
use serde::Serialize;

use crate::dataset::group_by_group_id;
use crate::error::RecordError;
use crate::evaluation::path_labeler::is_correct;
use crate::model::PredictionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    AllCorrect,
    PartiallyCorrect,
    AllWrong,
}

impl Stability {
    pub const ALL: [Self; 3] = [Self::AllCorrect, Self::PartiallyCorrect, Self::AllWrong];

    pub fn classify(correctness: &[bool]) -> Self {
        if correctness.iter().all(|correct| *correct) {
            Self::AllCorrect
        } else if correctness.iter().any(|correct| *correct) {
            Self::PartiallyCorrect
        } else {
            Self::AllWrong
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllCorrect => "all_correct",
            Self::PartiallyCorrect => "partially_correct",
            Self::AllWrong => "all_wrong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StabilityCounts {
    pub all_correct: usize,
    pub partially_correct: usize,
    pub all_wrong: usize,
}

impl StabilityCounts {
    pub fn get(&self, stability: Stability) -> usize {
        match stability {
            Stability::AllCorrect => self.all_correct,
            Stability::PartiallyCorrect => self.partially_correct,
            Stability::AllWrong => self.all_wrong,
        }
    }

    fn increment(&mut self, stability: Stability) {
        match stability {
            Stability::AllCorrect => self.all_correct += 1,
            Stability::PartiallyCorrect => self.partially_correct += 1,
            Stability::AllWrong => self.all_wrong += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.all_correct + self.partially_correct + self.all_wrong
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StabilityRatios {
    pub all_correct: f64,
    pub partially_correct: f64,
    pub all_wrong: f64,
}

impl StabilityRatios {
    fn from_counts(counts: &StabilityCounts) -> Self {
        let total = counts.total();
        let ratio = |count: usize| {
            if total > 0 {
                count as f64 / total as f64
            } else {
                0.0
            }
        };

        Self {
            all_correct: ratio(counts.all_correct),
            partially_correct: ratio(counts.partially_correct),
            all_wrong: ratio(counts.all_wrong),
        }
    }

    pub fn get(&self, stability: Stability) -> f64 {
        match stability {
            Stability::AllCorrect => self.all_correct,
            Stability::PartiallyCorrect => self.partially_correct,
            Stability::AllWrong => self.all_wrong,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramingRobustness {
    pub counts: StabilityCounts,
    pub ratios: StabilityRatios,
    pub path_transitions: IndexMap<String, usize>,
    pub unstable_examples: Vec<Vec<PredictionRecord>>,
}

/// A missing prediction or gold answer never counts as correct.
fn framing_is_correct(record: &PredictionRecord) -> bool {
    match (record.prediction.as_deref(), record.golden_answers.as_deref()) {
        (Some(prediction), Some(gold)) => is_correct(prediction, gold),
        _ => false,
    }
}

fn path_label(record: &PredictionRecord) -> Result<&str, RecordError> {
    record
        .path_label
        .as_deref()
        .ok_or_else(|| RecordError::missing("path_label", &record.group_id, record.qid.as_deref()))
}

/// Classifies every group by how many of its framings were answered
/// correctly, and counts path-label changes relative to the group's first
/// framing. Only baseline-versus-other pairs are counted, not all pairs.
pub fn analyze_framing_robustness(
    results: &[PredictionRecord],
) -> Result<FramingRobustness, RecordError> {
    let mut counts = StabilityCounts::default();
    let mut path_transitions = IndexMap::<String, usize>::new();
    let mut unstable_examples = Vec::new();

    for (_, items) in group_by_group_id(results) {
        let correctness = items.iter().map(framing_is_correct).collect::<Vec<_>>();

        let Some((baseline, others)) = items.split_first() else {
            continue;
        };
        let base_path = path_label(baseline)?;
        for other in others {
            let other_path = path_label(other)?;
            if other_path != base_path {
                *path_transitions
                    .entry(format!("{base_path} -> {other_path}"))
                    .or_default() += 1;
            }
        }

        let stability = Stability::classify(&correctness);
        counts.increment(stability);
        if stability == Stability::PartiallyCorrect {
            unstable_examples.push(items);
        }
    }

    Ok(FramingRobustness {
        ratios: StabilityRatios::from_counts(&counts),
        counts,
        path_transitions,
        unstable_examples,
    })
}

pub fn summarize_framing_robustness(result: &FramingRobustness) -> String {
    let mut lines = vec!["Framing Robustness Summary".to_string(), "-".repeat(40)];

    for stability in Stability::ALL {
        let count = result.counts.get(stability);
        let percent = result.ratios.get(stability) * 100.0;
        lines.push(format!(
            "{:<20}: {count:>5} ({percent:>6.2}%)",
            stability.as_str()
        ));
    }

    if !result.path_transitions.is_empty() {
        lines.push(String::new());
        lines.push("Path Transitions".to_string());
        lines.push("-".repeat(40));
        for (transition, count) in &result.path_transitions {
            lines.push(format!("{transition:<20}: {count}"));
        }
    }

    lines.join("\n")
}
