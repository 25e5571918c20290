// src/exec/command.rs

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::report::RunResult;

/// A shell command to run for one pipeline stage.
#[derive(Debug, Clone)]
pub struct ShellJob {
    /// Used in log lines to attribute output.
    pub label: String,
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

/// What happened to the child, plus how long it took.
#[derive(Debug, Clone, Copy)]
pub struct CommandResult {
    pub result: RunResult,
    pub runtime_seconds: f64,
}

/// Run a command through the platform shell, streaming stdout/stderr into
/// the log, and wait for it (with an optional wall-clock limit).
///
/// A non-zero exit maps to `Failed`; hitting the limit kills the child and
/// maps to `Timeout`. Only spawn/wait errors surface as `Err`.
pub async fn run_shell(job: &ShellJob, timeout: Option<Duration>) -> Result<CommandResult> {
    info!(label = %job.label, cmd = %job.command, "starting process");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&job.command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&job.command);
        c
    };

    if let Some(cwd) = &job.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &job.env {
        cmd.env(key, value);
    }

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for '{}'", job.label))?;

    // Always consume both pipes so buffers don't fill.
    if let Some(stdout) = child.stdout.take() {
        let label = job.label.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(label = %label, "stdout: {}", line);
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        let label = job.label.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(label = %label, "stderr: {}", line);
            }
        });
    }

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(label = %job.label, limit_s = limit.as_secs(), "wall-clock limit hit, killing process");
                child.kill().await.ok();
                return Ok(CommandResult {
                    result: RunResult::Timeout,
                    runtime_seconds: start.elapsed().as_secs_f64(),
                });
            }
        },
        None => child.wait().await,
    }
    .with_context(|| format!("waiting for process of '{}'", job.label))?;

    let runtime_seconds = start.elapsed().as_secs_f64();
    let code = status.code().unwrap_or(-1);
    let result = if status.success() {
        RunResult::Success
    } else {
        RunResult::Failed
    };

    info!(
        label = %job.label,
        exit_code = code,
        success = status.success(),
        runtime_s = format!("{runtime_seconds:.1}"),
        "process exited"
    );

    Ok(CommandResult {
        result,
        runtime_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(command: &str) -> ShellJob {
        ShellJob {
            label: "test".to_string(),
            command: command.to_string(),
            cwd: None,
            env: Vec::new(),
        }
    }

    #[tokio::test]
    async fn zero_exit_maps_to_success() {
        let res = run_shell(&job("true"), None).await.unwrap();
        assert_eq!(res.result, RunResult::Success);
    }

    #[tokio::test]
    async fn nonzero_exit_maps_to_failed() {
        let res = run_shell(&job("exit 3"), None).await.unwrap();
        assert_eq!(res.result, RunResult::Failed);
    }

    #[tokio::test]
    async fn wall_clock_limit_kills_the_child() {
        let res = run_shell(&job("sleep 5"), Some(Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!(res.result, RunResult::Timeout);
        assert!(res.runtime_seconds < 2.0);
    }
}
