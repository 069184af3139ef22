use thiserror::Error;

/// A record lacks a field that the requested computation cannot do without.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record in group {group_id} (qid {qid}) is missing required field `{field}`")]
    MissingField {
        field: &'static str,
        group_id: String,
        qid: String,
    },
}

impl RecordError {
    pub fn missing(field: &'static str, group_id: &str, qid: Option<&str>) -> Self {
        Self::MissingField {
            field,
            group_id: group_id.to_string(),
            qid: qid.unwrap_or("<none>").to_string(),
        }
    }
}
