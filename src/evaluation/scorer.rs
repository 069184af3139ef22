use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::evaluation::metrics::{MetricSummary, ScoredRecord, aggregate_metrics, compute_metrics};
use crate::model::{PredictionRecord, Role};

pub const UNKNOWN_BUCKET: &str = "unknown";
pub const OTHER_ROLE: &str = "other";

/// A dimension to break EM/F1 down by.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum GroupKey {
    Model,
    Qtype,
    Role,
    Hop,
    QuestionType,
    /// Any other column, looked up on the scored record (including `em` and
    /// `f1`) first and then in its metadata.
    Field(String),
}

impl GroupKey {
    /// Breakdown keys used when the caller does not pick any.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::Model,
            Self::Qtype,
            Self::Role,
            Self::Hop,
            Self::QuestionType,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Model => "model",
            Self::Qtype => "qtype",
            Self::Role => "role",
            Self::Hop => "hop",
            Self::QuestionType => "question_type",
            Self::Field(name) => name.as_str(),
        }
    }

    /// Bucket label for a scored record under this key.
    pub fn bucket(&self, item: &ScoredRecord) -> String {
        let record = &item.record;
        match self {
            Self::Model => record
                .model
                .clone()
                .unwrap_or_else(|| UNKNOWN_BUCKET.to_string()),
            Self::Qtype => record
                .qtype
                .clone()
                .unwrap_or_else(|| UNKNOWN_BUCKET.to_string()),
            Self::Role => record
                .role()
                .map(Role::as_str)
                .unwrap_or(OTHER_ROLE)
                .to_string(),
            Self::Hop => value_label(record.meta_value("hop")),
            Self::QuestionType => value_label(record.meta_value("question_type")),
            Self::Field(name) => match scored_field(item, name) {
                Some(value) if !value.is_null() => value_label(Some(&value)),
                _ => value_label(record.meta_value(name)),
            },
        }
    }
}

impl FromStr for GroupKey {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.trim() {
            "model" => Self::Model,
            "qtype" => Self::Qtype,
            "role" => Self::Role,
            "hop" => Self::Hop,
            "question_type" => Self::QuestionType,
            other => Self::Field(other.to_string()),
        })
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn scored_field(item: &ScoredRecord, name: &str) -> Option<Value> {
    match name {
        "em" => Some(Value::from(item.em)),
        "f1" => Some(Value::from(item.f1)),
        other => item.record.field(other),
    }
}

fn value_label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_BUCKET.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BucketSummary {
    pub em: f64,
    pub f1: f64,
    pub n: usize,
}

impl BucketSummary {
    fn of<'a>(items: impl IntoIterator<Item = &'a ScoredRecord>) -> Self {
        let items = items.into_iter().collect::<Vec<_>>();
        let MetricSummary { em, f1 } = aggregate_metrics(items.iter().copied());
        Self {
            em,
            f1,
            n: items.len(),
        }
    }
}

pub type Breakdown = IndexMap<String, IndexMap<String, BucketSummary>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub overall: MetricSummary,
    pub breakdown: Breakdown,
    pub scored: Vec<ScoredRecord>,
}

/// Scores every record, then aggregates EM/F1 overall and per bucket of
/// each key in `group_keys`. Buckets keep first-seen order.
pub fn score_predictions(predictions: &[PredictionRecord], group_keys: &[GroupKey]) -> ScoreReport {
    let scored = compute_metrics(predictions);
    let overall = aggregate_metrics(&scored);

    let mut breakdown = Breakdown::new();
    for key in group_keys {
        let mut buckets = IndexMap::<String, Vec<&ScoredRecord>>::new();
        for item in &scored {
            buckets.entry(key.bucket(item)).or_default().push(item);
        }

        let summaries = buckets
            .into_iter()
            .map(|(bucket, items)| (bucket, BucketSummary::of(items)))
            .collect();
        breakdown.insert(key.as_str().to_string(), summaries);
    }

    ScoreReport {
        overall,
        breakdown,
        scored,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MultiSubSummary {
    pub multi: BucketSummary,
    pub sub: BucketSummary,
    pub overall: BucketSummary,
}

pub fn score_by_multi_sub(predictions: &[PredictionRecord]) -> MultiSubSummary {
    let scored = compute_metrics(predictions);
    let with_role = |role: Role| {
        BucketSummary::of(scored.iter().filter(move |item| item.record.role() == Some(role)))
    };

    MultiSubSummary {
        multi: with_role(Role::Multi),
        sub: with_role(Role::Sub),
        overall: BucketSummary::of(&scored),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn prediction(qtype: &str, prediction: &str, gold: &str) -> PredictionRecord {
        let mut record = PredictionRecord::new("g1", qtype);
        record.prediction = Some(prediction.to_string());
        record.golden_answers = Some(gold.to_string());
        record
    }

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn empty_predictions_score_zero() {
        let report = score_predictions(&[], &GroupKey::defaults());
        assert_eq!(report.overall, MetricSummary { em: 0.0, f1: 0.0 });
        assert!(report.scored.is_empty());
        assert_eq!(report.breakdown.len(), 5);
        assert!(report.breakdown.values().all(|buckets| buckets.is_empty()));
    }

    #[test]
    fn default_breakdown_uses_unknown_for_missing_fields() {
        let mut multi = prediction("multi", "The Louvre", "louvre");
        multi.model = Some("gpt".to_string());
        multi.metadata = json!({"hop": 2, "question_type": "comparison"});
        let sub = prediction("sub1", "Paris", "London");
        let other = prediction("final", "x", "x");

        let report = score_predictions(&[multi, sub, other], &GroupKey::defaults());
        assert!(close(report.overall.em, 2.0 / 3.0));

        let model = &report.breakdown["model"];
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["gpt", "unknown"]);
        assert_eq!(model["unknown"].n, 2);
        assert!(close(model["unknown"].em, 0.5));

        let role = &report.breakdown["role"];
        assert_eq!(role.keys().collect::<Vec<_>>(), vec!["multi", "sub", "other"]);

        let hop = &report.breakdown["hop"];
        assert_eq!(hop["2"].n, 1);
        assert_eq!(hop["unknown"].n, 2);

        let question_type = &report.breakdown["question_type"];
        assert_eq!(question_type["comparison"].em, 1.0);
    }

    #[test]
    fn custom_key_checks_record_before_metadata() {
        let mut top_level = prediction("multi", "a", "a");
        top_level.extra.insert("split".to_string(), json!("dev"));
        top_level.metadata = json!({"split": "ignored"});

        let mut from_meta = prediction("sub1", "a", "b");
        from_meta.metadata = json!({"split": 7});

        let missing = prediction("sub2", "a", "b");

        let keys = vec!["split".parse::<GroupKey>().expect("infallible")];
        let report = score_predictions(&[top_level, from_meta, missing], &keys);
        let split = &report.breakdown["split"];
        assert_eq!(split.keys().collect::<Vec<_>>(), vec!["dev", "7", "unknown"]);
        assert_eq!(split["dev"], BucketSummary { em: 1.0, f1: 1.0, n: 1 });
    }

    #[test]
    fn custom_key_can_split_on_computed_scores() {
        let correct = prediction("multi", "Paris", "paris");
        let wrong = prediction("sub1", "Lyon", "paris");
        let also_correct = prediction("sub2", "the Paris", "Paris");

        let keys = vec![GroupKey::Field("em".to_string())];
        let report = score_predictions(&[correct, wrong, also_correct], &keys);
        let em = &report.breakdown["em"];
        assert_eq!(em.keys().collect::<Vec<_>>(), vec!["1", "0"]);
        assert_eq!(em["1"].n, 2);
        assert_eq!(em["0"], BucketSummary { em: 0.0, f1: 0.0, n: 1 });
    }

    #[test]
    fn scoring_does_not_touch_input_records() {
        let input = vec![prediction("multi", "a", "a")];
        let before = input.clone();
        let _ = score_predictions(&input, &GroupKey::defaults());
        assert_eq!(input, before);
    }

    #[test]
    fn multi_sub_split_counts_each_role() {
        let records = vec![
            prediction("multi", "a", "a"),
            prediction("sub1", "a", "b"),
            prediction("sub2", "b", "b"),
            prediction("final", "c", "d"),
        ];

        let summary = score_by_multi_sub(&records);
        assert_eq!(summary.multi.n, 1);
        assert_eq!(summary.multi.em, 1.0);
        assert_eq!(summary.sub.n, 2);
        assert!(close(summary.sub.em, 0.5));
        assert_eq!(summary.overall.n, 4);
        assert!(close(summary.overall.em, 0.5));
    }
}
