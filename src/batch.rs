// src/batch.rs

//! Batch fan-out.
//!
//! Every planned run executes as its own tokio task, gated by a semaphore so
//! at most `max_parallel` child processes exist at once. Results are
//! collected in submission order and written to `report.json` in the batch
//! directory.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::info;

use crate::exec::runner::{run_job, RunContext};
use crate::job::plan::BatchPlan;
use crate::report::{write_batch_report, BatchReport};

/// Run every job in the plan and collect the batch report.
pub async fn run_batch(
    plan: BatchPlan,
    ctx: Arc<RunContext>,
    max_parallel: usize,
) -> Result<BatchReport> {
    fs::create_dir_all(&plan.batch_path)
        .with_context(|| format!("creating batch directory {:?}", plan.batch_path))?;

    info!(
        batch = %plan.batch_name,
        runs = plan.jobs.len(),
        max_parallel,
        "starting batch"
    );

    let semaphore = Arc::new(Semaphore::new(max_parallel));
    let mut handles = Vec::with_capacity(plan.jobs.len());

    for spec in plan.jobs {
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            // acquire only fails if the semaphore is closed, which never happens here
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("batch semaphore closed");
            run_job(ctx, spec).await
        }));
    }

    // Await in submission order so the report matches the planned grid.
    let mut runs = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle.await.context("run task panicked")?;
        runs.push(report);
    }

    let report = BatchReport {
        batch_name: plan.batch_name.clone(),
        runs,
    };

    let report_path = write_batch_report(&plan.batch_path, &report)?;
    info!(
        batch = %plan.batch_name,
        succeeded = report.successes(),
        total = report.runs.len(),
        report = %report_path.display(),
        "batch finished"
    );

    Ok(report)
}
