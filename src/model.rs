use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MULTI_QTYPE: &str = "multi";
pub const SUB_QTYPE_PREFIX: &str = "sub";

/// One model inference outcome, as read from a prediction JSONL line.
///
/// Only `group_id` is mandatory at decode time. Columns that are not
/// modelled explicitly are kept in `extra` so that records survive a
/// load/save round trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub golden_answers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framing_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_label: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PredictionRecord {
    pub fn new(group_id: impl Into<String>, qtype: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            qid: None,
            qtype: Some(qtype.into()),
            question: None,
            golden_answers: None,
            prediction: None,
            model: None,
            framing_id: None,
            path_label: None,
            metadata: Value::Null,
            extra: Map::new(),
        }
    }

    pub fn qtype_str(&self) -> &str {
        self.qtype.as_deref().unwrap_or_default()
    }

    pub fn role(&self) -> Option<Role> {
        Role::classify(self.qtype_str())
    }

    /// Metadata as a mapping; anything that is not a JSON object reads as empty.
    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_object()
    }

    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta().and_then(|meta| meta.get(key))
    }

    /// Top-level field lookup by column name, covering both the typed
    /// columns and the passthrough ones.
    pub fn field(&self, key: &str) -> Option<Value> {
        let text = |value: &Option<String>| value.clone().map(Value::String);
        match key {
            "group_id" => Some(Value::String(self.group_id.clone())),
            "qid" => text(&self.qid),
            "qtype" => text(&self.qtype),
            "question" => text(&self.question),
            "golden_answers" => text(&self.golden_answers),
            "prediction" => text(&self.prediction),
            "model" => text(&self.model),
            "framing_id" => text(&self.framing_id),
            "path_label" => text(&self.path_label),
            "metadata" => (!self.metadata.is_null()).then(|| self.metadata.clone()),
            other => self.extra.get(other).cloned(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    Multi,
    Sub,
}

impl Role {
    pub fn classify(qtype: &str) -> Option<Self> {
        if qtype == MULTI_QTYPE {
            Some(Self::Multi)
        } else if qtype.starts_with(SUB_QTYPE_PREFIX) {
            Some(Self::Sub)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Multi => "multi",
            Self::Sub => "sub",
        }
    }
}

/// The multi-hop record of one source instance plus its sub-questions,
/// ordered by `qtype`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub multi: PredictionRecord,
    pub subs: Vec<PredictionRecord>,
}

pub type GroupedDataset = IndexMap<String, Group>;

#[derive(Debug, Clone, Serialize)]
pub struct InputFingerprint {
    pub path: String,
    pub sha256: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportManifest<T: Serialize> {
    pub manifest_version: u32,
    pub generated_at: String,
    pub command: String,
    pub inputs: Vec<InputFingerprint>,
    pub result: T,
}
