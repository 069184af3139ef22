use std::fmt::Write as _;

use anyhow::Result;
use multihop_paths::dataset::{DatasetFilter, load_dataset};
use multihop_paths::evaluation::scorer::{
    BucketSummary, GroupKey, MultiSubSummary, ScoreReport, score_by_multi_sub, score_predictions,
};
use tracing::info;

use crate::cli::ScoreArgs;
use crate::commands::report::{print_json, print_text, write_report};

pub fn run(args: ScoreArgs) -> Result<()> {
    let predictions = load_dataset(&args.input, &DatasetFilter::default())?;
    info!(input = %args.input.display(), records = predictions.len(), "loaded predictions");

    if args.multi_sub {
        let summary = score_by_multi_sub(&predictions);
        if args.json {
            print_json(&summary)?;
        } else {
            print_text(&format_multi_sub(&summary))?;
        }
        if let Some(output) = &args.output {
            write_report(output, &[args.input.as_path()], summary)?;
        }
        return Ok(());
    }

    let group_keys = if args.group_keys.is_empty() {
        GroupKey::defaults()
    } else {
        args.group_keys.clone()
    };
    let report = score_predictions(&predictions, &group_keys);
    info!(
        em = report.overall.em,
        f1 = report.overall.f1,
        keys = group_keys.len(),
        "scored predictions"
    );

    if args.json {
        print_json(&report)?;
    } else {
        print_text(&format_score_report(&report))?;
    }
    if let Some(output) = &args.output {
        write_report(output, &[args.input.as_path()], &report)?;
    }
    Ok(())
}

fn format_bucket(out: &mut String, label: &str, bucket: &BucketSummary) {
    let _ = writeln!(
        out,
        "  {label:<20} em={:.4} f1={:.4} n={}",
        bucket.em, bucket.f1, bucket.n
    );
}

fn format_score_report(report: &ScoreReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Overall: em={:.4} f1={:.4} n={}",
        report.overall.em,
        report.overall.f1,
        report.scored.len()
    );

    for (key, buckets) in &report.breakdown {
        let _ = writeln!(out, "[{key}]");
        for (label, bucket) in buckets {
            format_bucket(&mut out, label, bucket);
        }
    }
    out
}

fn format_multi_sub(summary: &MultiSubSummary) -> String {
    let mut out = String::new();
    format_bucket(&mut out, "multi", &summary.multi);
    format_bucket(&mut out, "sub", &summary.sub);
    format_bucket(&mut out, "overall", &summary.overall);
    out
}
