//! Answer-model capability used to turn question samples into prediction
//! records.
//!
//! Hosted and local inference backends live outside this crate. The only
//! backend here is [`ReplayModel`], which answers from raw responses recorded
//! per question id.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::PredictionRecord;
use crate::util::load_jsonl;

const DOCUMENT_KEYS: [&str; 3] = ["document_a", "document_b", "document_c"];

pub trait AnswerModel {
    fn name(&self) -> &str;

    fn format_prompt(&self, sample: &PredictionRecord) -> String;

    fn generate(&mut self, sample: &PredictionRecord, prompt: &str) -> Result<String>;

    fn parse_response(&self, response: &str) -> String;
}

/// Runs `model` over every sample and emits one prediction record each.
pub fn run_model<M>(model: &mut M, samples: &[PredictionRecord]) -> Result<Vec<PredictionRecord>>
where
    M: AnswerModel + ?Sized,
{
    let mut outputs = Vec::with_capacity(samples.len());
    for sample in samples {
        let prompt = model.format_prompt(sample);
        let raw_response = model.generate(sample, &prompt).with_context(|| {
            format!(
                "model {} failed on group {} qid {}",
                model.name(),
                sample.group_id,
                sample.qid.as_deref().unwrap_or("<none>")
            )
        })?;
        let prediction = model.parse_response(&raw_response);

        outputs.push(PredictionRecord {
            group_id: sample.group_id.clone(),
            qid: sample.qid.clone(),
            qtype: sample.qtype.clone(),
            question: sample.question.clone(),
            golden_answers: sample.golden_answers.clone(),
            prediction: Some(prediction),
            model: Some(model.name().to_string()),
            framing_id: None,
            path_label: None,
            metadata: sample.metadata.clone(),
            extra: Default::default(),
        });
    }

    debug!(model = model.name(), predictions = outputs.len(), "model run complete");
    Ok(outputs)
}

/// Prompt asking for a brief answer grounded only in the sample's
/// `document_a`/`document_b`/`document_c` passages.
pub fn format_document_prompt(sample: &PredictionRecord) -> String {
    let contexts = DOCUMENT_KEYS
        .iter()
        .filter_map(|key| sample.extra.get(*key))
        .map(|document| {
            let field = |name: &str| document.get(name).and_then(Value::as_str).unwrap_or_default();
            format!("[{}]\n{}", field("title"), field("contents"))
        })
        .collect::<Vec<_>>();

    format!(
        "Answer the following question using only the given documents.\n\
         Answer briefly and precisely.\n\n\
         {}\n\n\
         Question: {}\n\
         Answer:",
        contexts.join("\n\n"),
        sample.question.as_deref().unwrap_or_default()
    )
}

/// Keeps the first line of a trimmed response.
pub fn first_line_answer(response: &str) -> String {
    response
        .trim()
        .split('\n')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub qid: String,
    pub response: String,
}

/// Answers from previously recorded responses, keyed by `qid`. Samples with
/// no `qid` or no recording produce an empty response.
#[derive(Debug, Clone)]
pub struct ReplayModel {
    name: String,
    responses: HashMap<String, String>,
    misses: usize,
}

impl ReplayModel {
    pub fn new(
        name: impl Into<String>,
        recorded: impl IntoIterator<Item = RecordedResponse>,
    ) -> Self {
        Self {
            name: name.into(),
            responses: recorded
                .into_iter()
                .map(|entry| (entry.qid, entry.response))
                .collect(),
            misses: 0,
        }
    }

    pub fn from_jsonl(name: impl Into<String>, path: &Path) -> Result<Self> {
        let recorded = load_jsonl::<RecordedResponse>(path)?;
        Ok(Self::new(name, recorded))
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

impl AnswerModel for ReplayModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn format_prompt(&self, sample: &PredictionRecord) -> String {
        format_document_prompt(sample)
    }

    fn generate(&mut self, sample: &PredictionRecord, _prompt: &str) -> Result<String> {
        let recorded = sample
            .qid
            .as_deref()
            .and_then(|qid| self.responses.get(qid));
        match recorded {
            Some(response) => Ok(response.clone()),
            None => {
                self.misses += 1;
                warn!(
                    model = %self.name,
                    group_id = %sample.group_id,
                    qid = sample.qid.as_deref().unwrap_or("<none>"),
                    "no recorded response for sample"
                );
                Ok(String::new())
            }
        }
    }

    fn parse_response(&self, response: &str) -> String {
        first_line_answer(response)
    }
}
