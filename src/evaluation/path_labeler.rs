//! Per-group correctness paths such as `C/W/W`.
//!
//! Correctness here is deliberately looser than the exact-match metric in
//! [`crate::evaluation::metrics`]: answers are only trimmed and lowercased.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Group, GroupedDataset, PredictionRecord};

pub const PATH_SEPARATOR: &str = "/";

pub fn normalize_loose(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub fn is_correct(prediction: &str, gold: &str) -> bool {
    normalize_loose(prediction) == normalize_loose(gold)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Correctness {
    Correct,
    Wrong,
}

impl Correctness {
    pub fn of(record: &PredictionRecord) -> Self {
        let prediction = record.prediction.as_deref().unwrap_or_default();
        let gold = record.golden_answers.as_deref().unwrap_or_default();
        if is_correct(prediction, gold) {
            Self::Correct
        } else {
            Self::Wrong
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Correct => "C",
            Self::Wrong => "W",
        }
    }
}

/// Path label for one group: the multi-hop token first, then one token per
/// sub-question in `subs` order.
pub fn label_group_path(group: &Group) -> String {
    std::iter::once(&group.multi)
        .chain(group.subs.iter())
        .map(|record| Correctness::of(record).token())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

#[derive(Debug, Clone, Serialize)]
pub struct LabeledGroup<'a> {
    pub group_id: &'a str,
    pub path: String,
    pub multi: &'a PredictionRecord,
    pub subs: &'a [PredictionRecord],
}

pub type PathBuckets<'a> = IndexMap<String, Vec<LabeledGroup<'a>>>;

/// Files every group under its path label. Labels appear in first-seen
/// order and each bucket follows the iteration order of `grouped`.
pub fn label_all_paths(grouped: &GroupedDataset) -> PathBuckets<'_> {
    let mut buckets = PathBuckets::new();
    for (group_id, group) in grouped {
        let path = label_group_path(group);
        buckets.entry(path.clone()).or_default().push(LabeledGroup {
            group_id,
            path,
            multi: &group.multi,
            subs: &group.subs,
        });
    }
    buckets
}
