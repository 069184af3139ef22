use anyhow::Result;
use multihop_paths::dataset::{DatasetFilter, load_dataset};
use multihop_paths::predictor::{ReplayModel, run_model};
use multihop_paths::util::save_jsonl;
use tracing::{info, warn};

use crate::cli::ReplayArgs;

pub fn run(args: ReplayArgs) -> Result<()> {
    let samples = load_dataset(&args.samples, &DatasetFilter::default())?;
    let mut model = ReplayModel::from_jsonl(args.model_name.clone(), &args.responses)?;

    let predictions = run_model(&mut model, &samples)?;
    save_jsonl(&args.output, &predictions)?;

    if model.misses() > 0 {
        warn!(
            misses = model.misses(),
            samples = samples.len(),
            "samples without a recorded response were answered with an empty prediction"
        );
    }
    info!(
        model = %args.model_name,
        predictions = predictions.len(),
        output = %args.output.display(),
        "replay predictions written"
    );
    Ok(())
}
