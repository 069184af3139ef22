use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use multihop_paths::model::{InputFingerprint, ReportManifest};
use multihop_paths::util::{now_utc_string, sha256_file, write_json_pretty};
use serde::Serialize;
use tracing::info;

const REPORT_MANIFEST_VERSION: u32 = 1;

pub(crate) fn fingerprint(path: &Path) -> Result<InputFingerprint> {
    let file = File::open(path)
        .with_context(|| format!("failed to open input for fingerprint: {}", path.display()))?;

    let mut record_count = 0_usize;
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if !line.trim().is_empty() {
            record_count += 1;
        }
    }

    Ok(InputFingerprint {
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
        record_count,
    })
}

pub(crate) fn write_report<T: Serialize>(path: &Path, inputs: &[&Path], result: T) -> Result<()> {
    let inputs = inputs
        .iter()
        .map(|input| fingerprint(input))
        .collect::<Result<Vec<_>>>()?;

    let manifest = ReportManifest {
        manifest_version: REPORT_MANIFEST_VERSION,
        generated_at: now_utc_string(),
        command: std::env::args().collect::<Vec<_>>().join(" "),
        inputs,
        result,
    };

    write_json_pretty(path, &manifest)?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub(crate) fn print_text(text: &str) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    output.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(output)?;
    }
    output.flush()?;
    Ok(())
}
