// src/exec/runner.rs

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};

use crate::config::DesignSection;
use crate::contig::{self, ContigMode};
use crate::exec::command::{run_shell, ShellJob};
use crate::job::plan::JobSpec;
use crate::job::{build_design_command, build_diffusion_command, DesignParams, DiffusionParams};
use crate::pdb;
use crate::report::{DesignReport, RunReport};
use crate::symmetry::Symmetry;

/// Parameters shared by every run of a batch.
#[derive(Debug)]
pub struct RunContext {
    pub models_dir: PathBuf,
    pub diffusion_command: String,
    pub design: DesignSection,
    pub iterations: u32,
    pub symmetry: Option<Symmetry>,
    pub hotspot: Option<String>,
    pub chain_filter: Option<Vec<char>>,
    pub add_potential: bool,
    /// Designs per diffusion invocation. The fan-out already expands the
    /// design dimension, so this is 1 per run.
    pub designs_per_run: u32,
    /// Contents of the user's structure file, read once up front.
    pub pdb_content: Option<String>,
    pub timeout: Duration,
}

/// Run the full per-run pipeline; glue-level failures become a failed
/// report rather than an error, so one broken run never aborts the batch.
pub async fn run_job(ctx: Arc<RunContext>, spec: JobSpec) -> RunReport {
    let folder_name = spec.folder_name.clone();
    let run_path = spec.run_path.clone();
    match run_job_inner(ctx, spec).await {
        Ok(report) => report,
        Err(err) => {
            error!(run = %folder_name, error = %format!("{err:#}"), "run failed before execution");
            RunReport::planning_failure(folder_name, run_path, &err)
        }
    }
}

async fn run_job_inner(ctx: Arc<RunContext>, spec: JobSpec) -> Result<RunReport> {
    fs::create_dir_all(&spec.run_path)
        .with_context(|| format!("creating run directory {:?}", spec.run_path))?;
    fs::create_dir_all(spec.run_path.join("traj"))
        .with_context(|| format!("creating traj directory under {:?}", spec.run_path))?;

    let resolved = resolve_contigs(&ctx, &spec)?;

    let params = DiffusionParams {
        run_path: &spec.run_path,
        num_designs: ctx.designs_per_run,
        input_pdb: resolved.input_pdb.as_deref(),
        mode: resolved.mode,
        iterations: ctx.iterations,
        hotspot: ctx.hotspot.as_deref(),
        symmetry: ctx.symmetry.as_ref(),
        add_potential: ctx.add_potential,
        contigs: resolved.contigs,
    };
    let diffusion = build_diffusion_command(&ctx.diffusion_command, &params);

    info!(
        run = %spec.folder_name,
        mode = %resolved.mode,
        contigs = ?diffusion.contigs,
        output = %spec.run_path.display(),
        "starting diffusion"
    );

    let mut env = Vec::new();
    if let Some(gpu) = &spec.gpu {
        env.push(("CUDA_VISIBLE_DEVICES".to_string(), gpu.clone()));
    }

    let diffusion_job = ShellJob {
        label: format!("{}/diffusion", spec.folder_name),
        command: diffusion.command.clone(),
        cwd: Some(ctx.models_dir.clone()),
        env: env.clone(),
    };
    let diffusion_result = run_shell(&diffusion_job, Some(ctx.timeout)).await?;

    // The diffusion binary emits everything as one renumbered chain; write
    // the intended contig layout back into whatever files it produced.
    fix_output_structures(&ctx, &spec, &diffusion.contigs);

    let design = if diffusion_result.result.is_success() {
        let pdb_path = spec.run_path.join("output_0.pdb");
        let design_params = DesignParams {
            pdb: &pdb_path,
            loc: &spec.run_path,
            contigs: &diffusion.contigs,
            copies: diffusion.copies,
        };
        let command = build_design_command(&ctx.design, &design_params);
        let design_job = ShellJob {
            label: format!("{}/design", spec.folder_name),
            command: command.clone(),
            cwd: Some(ctx.models_dir.clone()),
            env,
        };
        let result = run_shell(&design_job, Some(ctx.timeout)).await?;
        Some(DesignReport {
            result: result.result,
            command,
            runtime_seconds: result.runtime_seconds,
        })
    } else {
        warn!(run = %spec.folder_name, "diffusion did not succeed, skipping sequence design");
        None
    };

    Ok(RunReport {
        folder_name: spec.folder_name,
        output_path: spec.run_path,
        result: diffusion_result.result,
        command: diffusion.command,
        runtime_seconds: diffusion_result.runtime_seconds,
        contigs: diffusion.contigs,
        copies: diffusion.copies,
        design,
        error: None,
    })
}

struct ResolvedContigs {
    mode: ContigMode,
    contigs: Vec<String>,
    input_pdb: Option<PathBuf>,
}

/// Classify the contig spec and fix the tokens up against the input
/// structure. Fixed and partial modes without a structure fall back to free
/// mode, as in a fully unconditional run.
fn resolve_contigs(ctx: &RunContext, spec: &JobSpec) -> Result<ResolvedContigs> {
    let tokens = contig::tokenize(&spec.contig_spec);
    let class = contig::classify(&tokens);
    let mut mode = class.mode;
    let mut rng = rand::thread_rng();

    if matches!(mode, ContigMode::Fixed | ContigMode::Partial) {
        if let Some(content) = &ctx.pdb_content {
            let pdb_path = spec.run_path.join("input.pdb");
            fs::write(&pdb_path, content)
                .with_context(|| format!("writing input structure to {:?}", pdb_path))?;

            let ranges = pdb::chain_ranges(content, ctx.chain_filter.as_deref());
            if ranges.is_empty() {
                bail!("input structure has no ATOM records for the selected chains");
            }

            let contigs = match mode {
                ContigMode::Partial => contig::fix_partial_contigs(&ranges),
                _ => contig::fix_contigs(&tokens, Some(&ranges), &mut rng)?,
            };
            return Ok(ResolvedContigs {
                mode,
                contigs,
                input_pdb: Some(pdb_path),
            });
        }

        warn!(
            run = %spec.folder_name,
            mode = %mode,
            "no input structure provided, falling back to free mode"
        );
        mode = ContigMode::Free;
    }

    let contigs = contig::fix_contigs(&tokens, None, &mut rng)?;
    Ok(ResolvedContigs {
        mode,
        contigs,
        input_pdb: None,
    })
}

/// Renumber every structure file the diffusion stage produced. Best-effort:
/// missing files are normal (a failed run produces none) and rewrite errors
/// are logged, not fatal.
fn fix_output_structures(ctx: &RunContext, spec: &JobSpec, contigs: &[String]) {
    let layout = match contig::residue_layout(contigs) {
        Ok(layout) => layout,
        Err(err) => {
            warn!(run = %spec.folder_name, error = %err, "cannot derive residue layout, leaving outputs as emitted");
            return;
        }
    };

    for n in 0..ctx.designs_per_run {
        let candidates = [
            spec.run_path.join(format!("output_{n}.pdb")),
            spec.run_path.join("traj").join(format!("output_{n}_pX0_traj.pdb")),
            spec.run_path.join("traj").join(format!("output_{n}_Xt-1_traj.pdb")),
        ];
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            let rewritten = fs::read_to_string(&path)
                .map(|content| pdb::renumber(&content, &layout))
                .and_then(|fixed| fs::write(&path, fixed));
            match rewritten {
                Ok(()) => info!(run = %spec.folder_name, file = %path.display(), "renumbered structure file"),
                Err(err) => {
                    warn!(run = %spec.folder_name, file = %path.display(), error = %err, "failed to renumber structure file")
                }
            }
        }
    }
}
