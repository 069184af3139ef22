//! How masking source evidence shifts the reasoning-path distribution.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::dataset::{DatasetFilter, load_grouped_dataset};
use crate::evaluation::path_distribution::{Distribution, compute_path_distribution};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskEffect {
    pub original: Distribution,
    pub masked: Distribution,
    pub delta: IndexMap<String, f64>,
}

/// `delta[path] = masked - original` for every path of the original
/// distribution. Paths seen only on the masked side get no delta entry.
pub fn compare_distributions(original: Distribution, masked: Distribution) -> MaskEffect {
    let delta = original
        .ratios
        .iter()
        .map(|(path, original_ratio)| (path.clone(), masked.ratio(path) - original_ratio))
        .collect();

    MaskEffect {
        original,
        masked,
        delta,
    }
}

/// Loads and groups both prediction files under the same filter and compares
/// their path distributions.
pub fn analyze_mask_effect(
    original_path: &Path,
    masked_path: &Path,
    filter: &DatasetFilter,
) -> Result<MaskEffect> {
    let original_groups = load_grouped_dataset(original_path, filter)
        .with_context(|| format!("failed to load original dataset {}", original_path.display()))?;
    let masked_groups = load_grouped_dataset(masked_path, filter)
        .with_context(|| format!("failed to load masked dataset {}", masked_path.display()))?;

    debug!(
        original_groups = original_groups.len(),
        masked_groups = masked_groups.len(),
        "grouped mask-effect inputs"
    );

    Ok(compare_distributions(
        compute_path_distribution(&original_groups),
        compute_path_distribution(&masked_groups),
    ))
}
