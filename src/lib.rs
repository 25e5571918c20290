// src/lib.rs

pub mod assets;
pub mod batch;
pub mod cli;
pub mod config;
pub mod contig;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod pdb;
pub mod report;
pub mod symmetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::assets::Provisioner;
use crate::cli::{CliArgs, Command, RunArgs};
use crate::config::ConfigFile;
use crate::contig::{partial_iterations, ContigMode};
use crate::exec::runner::RunContext;
use crate::job::plan::BatchPlan;
use crate::job::{build_diffusion_command, plan_batch, split_contig_specs, DiffusionParams};

const DEFAULT_CONFIG: &str = "Rfpilot.toml";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the weight provisioner (`init`)
/// - batch planning, fan-out, and reporting (`run`)
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let explicit = args.config != DEFAULT_CONFIG;
    let cfg = config::load_or_default(&config_path, explicit)?;

    match args.command {
        Command::Init { force } => Provisioner::new(&cfg).provision(force).await,
        Command::Run(run_args) => run_design_batch(cfg, run_args).await,
    }
}

async fn run_design_batch(cfg: ConfigFile, args: RunArgs) -> Result<()> {
    if let Some(hotspot) = args.hotspot.as_deref() {
        if !hotspot.trim().is_empty() {
            contig::validate_hotspot(hotspot)?;
        }
    }

    // An empty contig list with an input structure is a pure partial-mode
    // resample of that structure.
    let mut contig_specs = split_contig_specs(&args.contigs);
    if contig_specs.is_empty() {
        if args.pdb.is_none() {
            bail!("no contigs given and no input structure to resample");
        }
        contig_specs.push(String::new());
    }

    let gpus: Option<Vec<String>> = args.gpus.as_deref().map(|g| {
        g.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    });

    let plan = plan_batch(
        &args.name,
        args.batch_name.as_deref(),
        &contig_specs,
        args.num_designs,
        gpus.as_deref(),
        &cfg.paths.outputs_dir,
        &mut rand::thread_rng(),
    );

    if args.dry_run {
        print_dry_run(&cfg, &args, &plan);
        return Ok(());
    }

    let provisioner = Provisioner::new(&cfg);
    if !provisioner.is_provisioned() {
        bail!(
            "model weights not provisioned (missing {:?}); run `rfpilot init` first",
            provisioner.marker_path()
        );
    }

    let pdb_content = match &args.pdb {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading input structure {:?}", path))?,
        ),
        None => None,
    };

    let hotspot = args
        .hotspot
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let timeout = run_timeout(args.timeout_hours.unwrap_or(cfg.runner.timeout_hours))?;
    let max_parallel = args.max_parallel.unwrap_or(cfg.runner.max_parallel);
    if max_parallel == 0 {
        bail!("--max-parallel must be >= 1");
    }

    let ctx = Arc::new(RunContext {
        models_dir: cfg.paths.models_dir.clone(),
        diffusion_command: cfg.diffusion.command.clone(),
        design: cfg.design.clone(),
        iterations: args.iterations,
        symmetry: args.symmetry.resolve(args.order),
        hotspot,
        chain_filter: contig::parse_chain_filter(args.chains.as_deref()),
        add_potential: !args.no_potential,
        designs_per_run: 1,
        pdb_content,
        timeout,
    });

    info!(
        batch = %plan.batch_name,
        contigs = contig_specs.len(),
        designs_per_contig = args.num_designs,
        "planned {} runs",
        plan.jobs.len()
    );

    let report = batch::run_batch(plan, ctx, max_parallel).await?;

    println!("batch {} finished:", report.batch_name);
    for run in &report.runs {
        let design = match &run.design {
            Some(d) => format!(", design {:?}", d.result),
            None => String::new(),
        };
        println!(
            "  {}  {:?}{} ({:.1}s)",
            run.folder_name, run.result, design, run.runtime_seconds
        );
    }
    println!(
        "{}/{} runs succeeded",
        report.successes(),
        report.runs.len()
    );

    Ok(())
}

/// Convert a `--timeout-hours` value into the per-run wall-clock limit.
pub fn run_timeout(hours: f64) -> Result<Duration> {
    if !(hours > 0.0) {
        bail!("--timeout-hours must be positive (got {hours})");
    }
    Duration::try_from_secs_f64(hours * 3600.0)
        .map_err(|_| anyhow!("--timeout-hours {hours} is out of range"))
}

/// One planned run as `--dry-run` reports it.
#[derive(Debug, Clone)]
pub struct RunPreview {
    pub folder_name: String,
    pub contig_spec: String,
    pub mode: ContigMode,
    pub iterations: u32,
    pub gpu: Option<String>,
    /// The diffusion command line this run would execute.
    pub command: String,
}

/// Resolve every planned run far enough to show the diffusion command it
/// would execute. Fixed and partial contigs are resolved against the input
/// structure when it is readable; otherwise the raw tokens are shown.
pub fn preview_runs(cfg: &ConfigFile, args: &RunArgs, plan: &BatchPlan) -> Vec<RunPreview> {
    let pdb_content = args
        .pdb
        .as_ref()
        .and_then(|p| std::fs::read_to_string(p).ok());
    let symmetry = args.symmetry.resolve(args.order);
    let hotspot = args
        .hotspot
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let chain_filter = contig::parse_chain_filter(args.chains.as_deref());
    let mut rng = rand::thread_rng();

    plan.jobs
        .iter()
        .map(|job| {
            let tokens = contig::tokenize(&job.contig_spec);
            let class = contig::classify(&tokens);
            let (mode, contigs, has_input) = preview_contigs(
                &tokens,
                class.mode,
                pdb_content.as_deref(),
                chain_filter.as_deref(),
                &mut rng,
            );

            let input_pdb = has_input.then(|| job.run_path.join("input.pdb"));
            let cmd = build_diffusion_command(
                &cfg.diffusion.command,
                &DiffusionParams {
                    run_path: &job.run_path,
                    num_designs: 1,
                    input_pdb: input_pdb.as_deref(),
                    mode,
                    iterations: args.iterations,
                    hotspot,
                    symmetry: symmetry.as_ref(),
                    add_potential: !args.no_potential,
                    contigs,
                },
            );

            RunPreview {
                folder_name: job.folder_name.clone(),
                contig_spec: job.contig_spec.clone(),
                mode,
                iterations: match mode {
                    ContigMode::Partial => partial_iterations(args.iterations),
                    _ => args.iterations,
                },
                gpu: job.gpu.clone(),
                command: cmd.command,
            }
        })
        .collect()
}

fn preview_contigs(
    tokens: &[String],
    mode: ContigMode,
    pdb_content: Option<&str>,
    chain_filter: Option<&[char]>,
    rng: &mut impl rand::Rng,
) -> (ContigMode, Vec<String>, bool) {
    if matches!(mode, ContigMode::Fixed | ContigMode::Partial) {
        let Some(content) = pdb_content else {
            // Same fallback the runner applies: no structure means free mode.
            return (ContigMode::Free, tokens.to_vec(), false);
        };
        let ranges = pdb::chain_ranges(content, chain_filter);
        if !ranges.is_empty() {
            let resolved = match mode {
                ContigMode::Partial => Ok(contig::fix_partial_contigs(&ranges)),
                _ => contig::fix_contigs(tokens, Some(&ranges), rng),
            };
            if let Ok(contigs) = resolved {
                return (mode, contigs, true);
            }
        }
        return (mode, tokens.to_vec(), true);
    }
    match contig::fix_contigs(tokens, None, rng) {
        Ok(contigs) => (mode, contigs, false),
        Err(_) => (mode, tokens.to_vec(), false),
    }
}

/// Print the planned runs and the diffusion command each one would execute,
/// without touching the batch directory or starting any process.
fn print_dry_run(cfg: &ConfigFile, args: &RunArgs, plan: &BatchPlan) {
    println!("rfpilot dry-run");
    println!("  batch: {}", plan.batch_name);
    println!("  outputs: {}", plan.batch_path.display());
    println!("  design command: {}", cfg.design.command);
    if let Some(sym) = args.symmetry.resolve(args.order) {
        println!("  symmetry: {} ({} copies)", sym.tag, sym.copies);
    }
    println!();

    let previews = preview_runs(cfg, args, plan);
    println!("runs ({}):", previews.len());
    for run in &previews {
        println!("  - {}", run.folder_name);
        println!("      contig: '{}'", run.contig_spec);
        println!("      mode: {} (T={})", run.mode, run.iterations);
        if let Some(gpu) = &run.gpu {
            println!("      gpu: {gpu}");
        }
        println!("      cmd: {}", run.command);
    }
}
