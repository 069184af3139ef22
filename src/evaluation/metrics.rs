//! SQuAD-style answer normalization with exact-match and token F1 scoring.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::PredictionRecord;

const SCORE_COLUMNS: [&str; 2] = ["em", "f1"];

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));
static ARTICLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(a|an|the)\b").expect("valid article regex"));

/// Lowercases, drops punctuation and the articles `a`/`an`/`the`, and
/// collapses whitespace. Absent answers should be passed as `""`.
pub fn normalize_answer(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_punc = PUNCTUATION.replace_all(&lower, "");
    let no_articles = ARTICLES.replace_all(&no_punc, " ");
    no_articles.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn exact_match_score(prediction: &str, ground_truth: &str) -> u8 {
    u8::from(normalize_answer(prediction) == normalize_answer(ground_truth))
}

pub fn f1_score(prediction: &str, ground_truth: &str) -> f64 {
    let prediction = normalize_answer(prediction);
    let ground_truth = normalize_answer(ground_truth);
    let pred_tokens = prediction.split_whitespace().collect::<Vec<_>>();
    let gold_tokens = ground_truth.split_whitespace().collect::<Vec<_>>();

    if pred_tokens.is_empty() && gold_tokens.is_empty() {
        return 1.0;
    }
    if pred_tokens.is_empty() || gold_tokens.is_empty() {
        return 0.0;
    }

    let mut gold_counts = HashMap::<&str, usize>::new();
    for token in &gold_tokens {
        *gold_counts.entry(*token).or_default() += 1;
    }

    let mut num_same = 0_usize;
    for token in &pred_tokens {
        if let Some(remaining) = gold_counts.get_mut(*token) {
            if *remaining > 0 {
                *remaining -= 1;
                num_same += 1;
            }
        }
    }

    if num_same == 0 {
        return 0.0;
    }

    let precision = num_same as f64 / pred_tokens.len() as f64;
    let recall = num_same as f64 / gold_tokens.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

/// A prediction record with its exact-match and F1 scores attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: PredictionRecord,
    pub em: u8,
    pub f1: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricSummary {
    pub em: f64,
    pub f1: f64,
}

/// Scores every record against its gold answer. Missing predictions or gold
/// answers score as the empty string. Stale `em`/`f1` columns carried by the
/// input are replaced by the fresh scores.
pub fn compute_metrics(records: &[PredictionRecord]) -> Vec<ScoredRecord> {
    records
        .iter()
        .map(|record| {
            let prediction = record.prediction.as_deref().unwrap_or_default();
            let gold = record.golden_answers.as_deref().unwrap_or_default();
            let em = exact_match_score(prediction, gold);
            let f1 = f1_score(prediction, gold);

            let mut record = record.clone();
            for column in SCORE_COLUMNS {
                record.extra.remove(column);
            }
            ScoredRecord { record, em, f1 }
        })
        .collect()
}

pub fn aggregate_metrics<'a, I>(scored: I) -> MetricSummary
where
    I: IntoIterator<Item = &'a ScoredRecord>,
{
    let mut count = 0_usize;
    let mut em_total = 0.0_f64;
    let mut f1_total = 0.0_f64;
    for item in scored {
        count += 1;
        em_total += f64::from(item.em);
        f1_total += item.f1;
    }

    if count == 0 {
        return MetricSummary::default();
    }

    MetricSummary {
        em: em_total / count as f64,
        f1: f1_total / count as f64,
    }
}
