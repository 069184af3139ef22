use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;

use crate::evaluation::path_labeler::label_all_paths;
use crate::model::GroupedDataset;

/// Group counts per path label. Labels that never occur are absent from
/// both maps and read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub counts: IndexMap<String, usize>,
    pub ratios: IndexMap<String, f64>,
    pub total: usize,
}

impl Distribution {
    pub fn from_counts(counts: IndexMap<String, usize>) -> Self {
        let total = counts.values().sum::<usize>();
        let ratios = counts
            .iter()
            .map(|(path, count)| {
                let ratio = if total > 0 {
                    *count as f64 / total as f64
                } else {
                    0.0
                };
                (path.clone(), ratio)
            })
            .collect();

        Self {
            counts,
            ratios,
            total,
        }
    }

    pub fn count(&self, path: &str) -> usize {
        self.counts.get(path).copied().unwrap_or(0)
    }

    pub fn ratio(&self, path: &str) -> f64 {
        self.ratios.get(path).copied().unwrap_or(0.0)
    }
}

pub fn compute_path_distribution(grouped: &GroupedDataset) -> Distribution {
    let counts = label_all_paths(grouped)
        .into_iter()
        .map(|(path, groups)| (path, groups.len()))
        .collect();
    Distribution::from_counts(counts)
}

/// Fixed-width table, one row per label in lexicographic order.
pub fn format_path_distribution(dist: &Distribution) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total groups: {}", dist.total);
    let _ = writeln!(out, "{}", "-".repeat(40));

    let mut paths = dist.counts.keys().collect::<Vec<_>>();
    paths.sort();
    for path in paths {
        let count = dist.count(path);
        let percent = dist.ratio(path) * 100.0;
        let _ = writeln!(out, "{path:<7} : {count:>5} ({percent:>6.2}%)");
    }
    out
}

pub fn print_path_distribution(dist: &Distribution) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    output.write_all(format_path_distribution(dist).as_bytes())?;
    output.flush()?;
    Ok(())
}
