use anyhow::Result;
use multihop_paths::dataset::load_grouped_dataset;
use multihop_paths::evaluation::path_distribution::{
    compute_path_distribution, print_path_distribution,
};
use multihop_paths::evaluation::path_labeler::label_all_paths;
use multihop_paths::util::write_json_pretty;
use tracing::info;

use crate::cli::PathsArgs;
use crate::commands::report::{print_json, write_report};

pub fn run(args: PathsArgs) -> Result<()> {
    let filter = args.selection.filter();
    let grouped = load_grouped_dataset(&args.input, &filter)?;
    let distribution = compute_path_distribution(&grouped);

    info!(
        input = %args.input.display(),
        hop = ?filter.hop,
        question_type = ?filter.question_type,
        groups = distribution.total,
        paths = distribution.counts.len(),
        "path distribution computed"
    );

    if args.json {
        print_json(&distribution)?;
    } else {
        print_path_distribution(&distribution)?;
    }

    if let Some(buckets_output) = &args.buckets_output {
        let buckets = label_all_paths(&grouped);
        write_json_pretty(buckets_output, &buckets)?;
        info!(path = %buckets_output.display(), "wrote path buckets");
    }
    if let Some(output) = &args.output {
        write_report(output, &[args.input.as_path()], &distribution)?;
    }
    Ok(())
}
