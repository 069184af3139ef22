use anyhow::{Context, Result};
use multihop_paths::PredictionRecord;
use multihop_paths::analysis::framing_robustness::{
    analyze_framing_robustness, summarize_framing_robustness,
};
use multihop_paths::util::load_jsonl;
use tracing::info;

use crate::cli::FramingArgs;
use crate::commands::report::{print_json, print_text, write_report};

pub fn run(args: FramingArgs) -> Result<()> {
    let results = load_jsonl::<PredictionRecord>(&args.input)?;
    let analysis = analyze_framing_robustness(&results)
        .with_context(|| format!("framing analysis failed for {}", args.input.display()))?;

    info!(
        records = results.len(),
        groups = analysis.counts.total(),
        unstable = analysis.unstable_examples.len(),
        transitions = analysis.path_transitions.len(),
        "framing robustness computed"
    );

    if args.json {
        print_json(&analysis)?;
    } else {
        print_text(&summarize_framing_robustness(&analysis))?;
    }

    if let Some(output) = &args.output {
        write_report(output, &[args.input.as_path()], &analysis)?;
    }
    Ok(())
}
