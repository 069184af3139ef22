use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::RecordError;
use crate::model::{Group, GroupedDataset, MULTI_QTYPE, PredictionRecord, Role};
use crate::util::load_jsonl;

/// Independent, AND-combined record filters. `None` disables a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetFilter {
    pub hop: Option<u64>,
    pub question_type: Option<String>,
    pub role: Option<Role>,
}

impl DatasetFilter {
    pub fn new(hop: Option<u64>, question_type: Option<String>) -> Self {
        Self {
            hop,
            question_type,
            role: None,
        }
    }

    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    pub fn matches(&self, record: &PredictionRecord) -> bool {
        if let Some(hop) = self.hop {
            // Integral floats such as `2.0` count as the same hop.
            let record_hop = record.meta_value("hop").and_then(|value| value.as_f64());
            if record_hop != Some(hop as f64) {
                return false;
            }
        }

        if let Some(question_type) = &self.question_type {
            let record_type = record
                .meta_value("question_type")
                .and_then(|value| value.as_str());
            if record_type != Some(question_type.as_str()) {
                return false;
            }
        }

        match self.role {
            Some(role) => record.role() == Some(role),
            None => true,
        }
    }

    pub fn apply(&self, records: Vec<PredictionRecord>) -> Vec<PredictionRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

/// Loads a prediction JSONL file and keeps the records that pass `filter`,
/// in file order.
pub fn load_dataset(path: &Path, filter: &DatasetFilter) -> Result<Vec<PredictionRecord>> {
    let records = load_jsonl::<PredictionRecord>(path)?;
    let loaded = records.len();
    let filtered = filter.apply(records);

    debug!(
        path = %path.display(),
        loaded,
        kept = filtered.len(),
        "filtered dataset"
    );
    Ok(filtered)
}

/// Buckets records by `group_id`. Buckets and their contents keep
/// first-seen order.
pub fn group_by_group_id(records: &[PredictionRecord]) -> IndexMap<String, Vec<PredictionRecord>> {
    let mut groups = IndexMap::<String, Vec<PredictionRecord>>::new();
    for record in records {
        groups
            .entry(record.group_id.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Splits every `group_id` bucket into its multi-hop record and its
/// sub-questions sorted by `qtype`.
///
/// When a bucket holds several `multi` records the last one wins. Buckets
/// without any `multi` record are dropped.
pub fn build_groups(records: &[PredictionRecord]) -> Result<GroupedDataset, RecordError> {
    let mut output = GroupedDataset::new();
    let mut dropped = 0_usize;

    for (group_id, items) in group_by_group_id(records) {
        let mut multi = None;
        let mut subs = Vec::with_capacity(items.len().saturating_sub(1));

        for item in items {
            let Some(qtype) = item.qtype.as_deref() else {
                return Err(RecordError::missing("qtype", &item.group_id, item.qid.as_deref()));
            };
            if qtype == MULTI_QTYPE {
                multi = Some(item);
            } else {
                subs.push(item);
            }
        }

        let Some(multi) = multi else {
            dropped += 1;
            continue;
        };

        subs.sort_by(|left, right| left.qtype_str().cmp(right.qtype_str()));
        output.insert(group_id, Group { multi, subs });
    }

    if dropped > 0 {
        debug!(dropped, kept = output.len(), "skipped groups without a multi record");
    }
    Ok(output)
}

/// Loads, filters by hop and question type, and groups a prediction file.
/// Any role set on `filter` is ignored since grouping needs both roles.
pub fn load_grouped_dataset(path: &Path, filter: &DatasetFilter) -> Result<GroupedDataset> {
    let filter = filter.clone().with_role(None);
    let records = load_dataset(path, &filter)?;
    let grouped = build_groups(&records)?;
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;

    fn record(group_id: &str, qtype: &str) -> PredictionRecord {
        PredictionRecord::new(group_id, qtype)
    }

    fn write_fixture(dir: &Path, rows: &[serde_json::Value]) -> std::path::PathBuf {
        let path = dir.join("predictions.jsonl");
        let body = rows
            .iter()
            .map(|row| row.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(&path, body).expect("write fixture");
        path
    }

    #[test]
    fn filters_combine_and_preserve_file_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_fixture(
            dir.path(),
            &[
                json!({"group_id": "g1", "qtype": "multi", "metadata": {"hop": 2, "question_type": "comparison"}}),
                json!({"group_id": "g1", "qtype": "sub1", "metadata": {"hop": 2, "question_type": "comparison"}}),
                json!({"group_id": "g2", "qtype": "multi", "metadata": {"hop": 3, "question_type": "bridge"}}),
                json!({"group_id": "g3", "qtype": "sub2", "metadata": {"hop": 2, "question_type": "bridge"}}),
                json!({"group_id": "g4", "qtype": "multi"}),
            ],
        );

        let all = load_dataset(&path, &DatasetFilter::default()).expect("load");
        assert_eq!(all.len(), 5);

        let hop2 = load_dataset(&path, &DatasetFilter::new(Some(2), None)).expect("load");
        let ids = hop2.iter().map(|r| r.group_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["g1", "g1", "g3"]);

        let hop2_sub_bridge = load_dataset(
            &path,
            &DatasetFilter::new(Some(2), Some("bridge".to_string())).with_role(Some(Role::Sub)),
        )
        .expect("load");
        assert_eq!(hop2_sub_bridge.len(), 1);
        assert_eq!(hop2_sub_bridge[0].group_id, "g3");

        let multis = load_dataset(&path, &DatasetFilter::default().with_role(Some(Role::Multi)))
            .expect("load");
        let ids = multis.iter().map(|r| r.group_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["g1", "g2", "g4"]);
    }

    #[test]
    fn hop_filter_matches_numeric_hops_only() {
        let mut item = record("g1", "multi");
        item.metadata = json!({"hop": "2"});
        assert!(!DatasetFilter::new(Some(2), None).matches(&item));

        item.metadata = json!({"hop": 2.0});
        assert!(DatasetFilter::new(Some(2), None).matches(&item));

        item.metadata = json!({"hop": 2.5});
        assert!(!DatasetFilter::new(Some(2), None).matches(&item));

        item.metadata = json!("not a mapping");
        assert!(DatasetFilter::default().matches(&item));
        assert!(!DatasetFilter::new(Some(2), None).matches(&item));
    }

    #[test]
    fn group_by_group_id_keeps_first_seen_order() {
        let records = vec![
            record("b", "multi"),
            record("a", "sub1"),
            record("b", "sub2"),
            record("a", "multi"),
        ];

        let groups = group_by_group_id(&records);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        let a_types = groups["a"].iter().map(|r| r.qtype_str()).collect::<Vec<_>>();
        assert_eq!(a_types, vec!["sub1", "multi"]);
    }

    #[test]
    fn build_groups_sorts_subs_and_drops_incomplete_groups() {
        let mut late_multi = record("g1", "multi");
        late_multi.prediction = Some("second".to_string());

        let records = vec![
            record("g1", "sub3"),
            record("g1", "multi"),
            record("g2", "sub1"),
            record("g1", "sub1"),
            late_multi,
            record("g1", "sub2"),
        ];

        let grouped = build_groups(&records).expect("group");
        assert_eq!(grouped.len(), 1);
        let group = &grouped["g1"];
        assert_eq!(group.multi.prediction.as_deref(), Some("second"));
        let sub_types = group.subs.iter().map(|r| r.qtype_str()).collect::<Vec<_>>();
        assert_eq!(sub_types, vec!["sub1", "sub2", "sub3"]);
    }

    #[test]
    fn build_groups_requires_qtype() {
        let mut untyped = record("g1", "multi");
        untyped.qtype = None;

        let error = build_groups(&[untyped]).expect_err("qtype is required for grouping");
        assert!(matches!(error, RecordError::MissingField { field: "qtype", .. }));
    }

    #[test]
    fn load_grouped_dataset_ignores_role_filter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_fixture(
            dir.path(),
            &[
                json!({"group_id": "g1", "qtype": "sub1", "metadata": {"hop": 2}}),
                json!({"group_id": "g1", "qtype": "multi", "metadata": {"hop": 2}}),
                json!({"group_id": "g2", "qtype": "multi", "metadata": {"hop": 3}}),
            ],
        );

        let filter = DatasetFilter::new(Some(2), None).with_role(Some(Role::Multi));
        let grouped = load_grouped_dataset(&path, &filter).expect("load");
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["g1"]);
        assert_eq!(grouped["g1"].subs.len(), 1);
    }

    #[test]
    fn missing_group_id_fails_with_line_number() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_fixture(
            dir.path(),
            &[
                json!({"group_id": "g1", "qtype": "multi"}),
                json!({"qtype": "sub1"}),
            ],
        );

        let error = load_dataset(&path, &DatasetFilter::default()).expect_err("no group_id");
        assert!(error.to_string().contains("line 2"), "unexpected error: {error}");
    }
}
