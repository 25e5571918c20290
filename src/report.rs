// src/report.rs

//! Per-run and per-batch result records, serialized to `report.json` in the
//! batch directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// Final status of a child-process stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Success,
    Failed,
    Timeout,
}

impl RunResult {
    pub fn is_success(self) -> bool {
        matches!(self, RunResult::Success)
    }
}

/// Outcome of the sequence-design stage of one run.
#[derive(Debug, Clone, Serialize)]
pub struct DesignReport {
    pub result: RunResult,
    pub command: String,
    pub runtime_seconds: f64,
}

/// Outcome of one diffusion run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub folder_name: String,
    pub output_path: PathBuf,
    pub result: RunResult,
    /// Full shell command of the diffusion stage.
    pub command: String,
    pub runtime_seconds: f64,
    /// Fixed-up contig tokens (after symmetry replication).
    pub contigs: Vec<String>,
    pub copies: usize,
    /// Present only when the diffusion stage succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignReport>,
    /// Glue-level error (I/O, planning) rather than a child exit code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    /// Report for a run that failed before its process could start.
    pub fn planning_failure(folder_name: String, output_path: PathBuf, err: &anyhow::Error) -> Self {
        Self {
            folder_name,
            output_path,
            result: RunResult::Failed,
            command: String::new(),
            runtime_seconds: 0.0,
            contigs: Vec::new(),
            copies: 0,
            design: None,
            error: Some(format!("{err:#}")),
        }
    }
}

/// Everything produced by one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_name: String,
    pub runs: Vec<RunReport>,
}

impl BatchReport {
    pub fn successes(&self) -> usize {
        self.runs.iter().filter(|r| r.result.is_success()).count()
    }
}

/// Write `report.json` into the batch directory; returns the file path.
pub fn write_batch_report(batch_path: &Path, report: &BatchReport) -> Result<PathBuf> {
    let path = batch_path.join("report.json");
    let json = serde_json::to_string_pretty(report).context("serializing batch report")?;
    fs::write(&path, json).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}
