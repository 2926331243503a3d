//! Newline-delimited JSON report records for conversion runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Outcome of converting one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    /// Output written.
    Converted,
    /// Conversion failed; no output written.
    Failed,
}

/// One line of a conversion report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionMetric {
    /// Source path as given to the driver.
    pub source: String,
    /// Destination path the output was (or would have been) written to.
    pub destination: String,
    /// Mesh variant name.
    pub variant: String,
    /// Optimization level used.
    pub optimization: u8,
    /// Result of the conversion.
    pub status: ConversionStatus,
    /// Surviving voxels per frame (empty on failure).
    #[serde(default)]
    pub voxel_counts: Vec<usize>,
    /// Output size in bytes (0 on failure).
    #[serde(default)]
    pub output_bytes: usize,
    /// blake3 hash of the output (hex), for determinism checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Error message when the conversion failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary line closing a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetric {
    /// RFC 3339 timestamp of when the run finished.
    pub finished_at: String,
    /// Files written.
    pub converted: usize,
    /// Files skipped because of errors.
    pub failed: usize,
    /// Total voxels written across all files and frames.
    pub voxels: usize,
}

impl BatchMetric {
    /// Summary stamped with the current time.
    pub fn now(converted: usize, failed: usize, voxels: usize) -> Self {
        Self {
            finished_at: chrono::Utc::now().to_rfc3339(),
            converted,
            failed,
            voxels,
        }
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create (truncate) a sink at `path`, creating parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent(path)?;
        let file = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        Ok(Self { file })
    }

    /// Open a sink at `path` that appends to existing content.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open report {}", path.display()))?;
        Ok(Self { file })
    }

    /// Append one record as a JSON line.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// Read back every conversion record from a report, skipping summary lines.
pub fn read_conversion_metrics<P: AsRef<Path>>(path: P) -> Result<Vec<ConversionMetric>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open report {}", path.display()))?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(record) = serde_json::from_str::<ConversionMetric>(&line) {
            records.push(record);
        }
    }
    Ok(records)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {parent:?}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(source: &str, status: ConversionStatus) -> ConversionMetric {
        ConversionMetric {
            source: source.to_string(),
            destination: source.replace(".vox", ".vxm"),
            variant: "animated".to_string(),
            optimization: 1,
            status,
            voxel_counts: vec![3, 4],
            output_bytes: 120,
            hash: Some("ab".repeat(32)),
            error: None,
        }
    }

    #[test]
    fn records_round_trip_through_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.jsonl");

        let mut sink = JsonlSink::create(&path).expect("sink");
        sink.write(&metric("a.vox", ConversionStatus::Converted)).unwrap();
        sink.write(&metric("b.vox", ConversionStatus::Failed)).unwrap();
        sink.write(&BatchMetric::now(1, 1, 7)).unwrap();
        drop(sink);

        let records = read_conversion_metrics(&path).expect("read back");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], metric("a.vox", ConversionStatus::Converted));
        assert_eq!(records[1].status, ConversionStatus::Failed);
    }

    #[test]
    fn append_keeps_previous_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        JsonlSink::create(&path)
            .unwrap()
            .write(&metric("a.vox", ConversionStatus::Converted))
            .unwrap();
        JsonlSink::append(&path)
            .unwrap()
            .write(&metric("b.vox", ConversionStatus::Converted))
            .unwrap();

        assert_eq!(read_conversion_metrics(&path).unwrap().len(), 2);
    }

    #[test]
    fn status_serializes_lowercase() {
        let line = serde_json::to_string(&metric("a.vox", ConversionStatus::Failed)).unwrap();
        assert!(line.contains("\"status\":\"failed\""));
        assert!(!line.contains("\"error\""));
    }
}
