use std::fmt::Write as _;

use anyhow::Result;
use multihop_paths::analysis::mask_effect::{MaskEffect, analyze_mask_effect};
use multihop_paths::evaluation::path_distribution::format_path_distribution;
use tracing::info;

use crate::cli::MaskEffectArgs;
use crate::commands::report::{print_json, print_text, write_report};

pub fn run(args: MaskEffectArgs) -> Result<()> {
    let filter = args.selection.filter();
    let effect = analyze_mask_effect(&args.original, &args.masked, &filter)?;

    let masked_only = effect
        .masked
        .counts
        .keys()
        .filter(|path| !effect.original.counts.contains_key(*path))
        .count();
    info!(
        original_groups = effect.original.total,
        masked_groups = effect.masked.total,
        masked_only_paths = masked_only,
        "mask effect computed"
    );

    if args.json {
        print_json(&effect)?;
    } else {
        print_text(&format_mask_effect(&effect))?;
    }

    if let Some(output) = &args.output {
        write_report(
            output,
            &[args.original.as_path(), args.masked.as_path()],
            &effect,
        )?;
    }
    Ok(())
}

fn format_mask_effect(effect: &MaskEffect) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Original");
    out.push_str(&format_path_distribution(&effect.original));
    let _ = writeln!(out, "\nMasked");
    out.push_str(&format_path_distribution(&effect.masked));
    let _ = writeln!(out, "\nDelta (masked - original)");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for (path, delta) in &effect.delta {
        let _ = writeln!(out, "{path:<7} : {:>+8.2}%", delta * 100.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use multihop_paths::analysis::mask_effect::compare_distributions;
    use multihop_paths::evaluation::path_distribution::Distribution;

    use super::*;

    #[test]
    fn delta_section_uses_signed_percentages() {
        let mut original = IndexMap::new();
        original.insert("C/C".to_string(), 3);
        original.insert("C/W".to_string(), 1);
        let mut masked = IndexMap::new();
        masked.insert("C/C".to_string(), 1);
        masked.insert("C/W".to_string(), 3);

        let effect = compare_distributions(
            Distribution::from_counts(original),
            Distribution::from_counts(masked),
        );
        let text = format_mask_effect(&effect);
        assert!(text.contains("C/C     :   -50.00%"), "{text}");
        assert!(text.contains("C/W     :   +50.00%"), "{text}");
    }
}
