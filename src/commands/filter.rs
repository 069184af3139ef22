use anyhow::Result;
use multihop_paths::Role;
use multihop_paths::dataset::load_dataset;
use multihop_paths::util::save_jsonl;
use tracing::info;

use crate::cli::FilterArgs;

pub fn run(args: FilterArgs) -> Result<()> {
    let filter = args
        .selection
        .filter()
        .with_role(args.role.map(Role::from));

    let records = load_dataset(&args.input, &filter)?;
    save_jsonl(&args.output, &records)?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        hop = ?filter.hop,
        question_type = ?filter.question_type,
        role = ?filter.role,
        kept = records.len(),
        "filtered dataset written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::Value;

    use super::*;
    use crate::cli::SelectionArgs;

    #[test]
    fn filtered_output_keeps_unknown_columns_and_drops_null_typed_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("out").join("multi.jsonl");
        fs::write(
            &input,
            concat!(
                "{\"group_id\":\"g1\",\"qtype\":\"multi\",\"qid\":null,\"metadata\":null,",
                "\"document_a\":{\"title\":\"A\"},\"notes\":null}\n",
                "{\"group_id\":\"g1\",\"qtype\":\"sub1\"}\n"
            ),
        )
        .expect("write fixture");

        run(FilterArgs {
            input,
            selection: SelectionArgs::default(),
            role: Some(crate::cli::RoleArg::Multi),
            output: output.clone(),
        })
        .expect("filter");

        let raw = fs::read_to_string(&output).expect("read output");
        let rows = raw
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).expect("row"))
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_object().expect("object");
        assert_eq!(row["document_a"]["title"], "A");
        assert!(row["notes"].is_null());
        assert!(row.contains_key("notes"));
        assert!(!row.contains_key("qid"));
        assert!(!row.contains_key("metadata"));
    }
}
