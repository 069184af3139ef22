use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Reads one JSON value per non-blank line.
pub fn load_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file =
        File::open(path).with_context(|| format!("failed to open jsonl: {}", path.display()))?;

    let mut out = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| {
            format!("failed to read line {} of {}", index + 1, path.display())
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value = serde_json::from_str(trimmed).with_context(|| {
            format!("failed to parse line {} of {}", index + 1, path.display())
        })?;
        out.push(value);
    }

    Ok(out)
}

pub fn save_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    ensure_parent(path)?;

    let file = File::create(path)
        .with_context(|| format!("failed to create jsonl file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)
            .with_context(|| format!("failed to serialize jsonl row: {}", path.display()))?;
        writer
            .write_all(b"\n")
            .with_context(|| format!("failed to write jsonl file: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to finalize jsonl file: {}", path.display()))?;

    Ok(())
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn load_jsonl_skips_blank_lines_and_reports_line_numbers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rows.jsonl");
        fs::write(&path, "{\"a\": 1}\n\n   \n{\"a\": 2}\n").expect("write fixture");

        let rows: Vec<Value> = load_jsonl(&path).expect("rows should load");
        assert_eq!(rows, vec![json!({"a": 1}), json!({"a": 2})]);

        fs::write(&path, "{\"a\": 1}\nnot json\n").expect("write fixture");
        let error = load_jsonl::<Value>(&path).expect_err("second line is malformed");
        assert!(
            error.to_string().contains("line 2"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn save_jsonl_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("out").join("rows.jsonl");

        save_jsonl(&path, &[json!({"q": "ü"}), json!({"q": "b"})]).expect("save");
        let raw = fs::read_to_string(&path).expect("read back");
        assert_eq!(raw, "{\"q\":\"ü\"}\n{\"q\":\"b\"}\n");
    }

    #[test]
    fn sha256_file_is_stable_for_identical_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("a.jsonl");
        let second = dir.path().join("b.jsonl");
        fs::write(&first, "abc").expect("write");
        fs::write(&second, "abc").expect("write");

        let digest = sha256_file(&first).expect("hash");
        assert_eq!(digest, sha256_file(&second).expect("hash"));
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
