// src/cli.rs

//! CLI argument parsing using `clap` (derive feature).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::symmetry::SymmetryMode;

/// Command-line arguments for `rfpilot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rfpilot",
    version,
    about = "Provision model weights and drive diffusion + sequence-design runs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Rfpilot.toml` in the current working directory. The file is
    /// optional at the default location; built-in defaults are used when it
    /// is absent.
    #[arg(long, value_name = "PATH", default_value = "Rfpilot.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RFPILOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download model weights into the models directory (idempotent).
    Init {
        /// Re-download even if the completion marker is present.
        #[arg(long)]
        force: bool,
    },

    /// Plan and execute a batch of diffusion + sequence-design runs.
    Run(RunArgs),
}

/// Parameters for a design batch.
///
/// Each comma-separated contig spec is crossed with `--num-designs` to give
/// the set of independent runs in the batch.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Base name used in run folder names.
    #[arg(long, default_value = "design")]
    pub name: String,

    /// Batch directory name; defaults to `batch_{timestamp}`.
    #[arg(long, value_name = "NAME")]
    pub batch_name: Option<String>,

    /// Comma-separated contig specifications.
    #[arg(long, default_value = "100")]
    pub contigs: String,

    /// Local structure file used by fixed and partial contig modes.
    #[arg(long, value_name = "PATH")]
    pub pdb: Option<PathBuf>,

    /// Diffusion iteration count (`diffuser.T`); rescaled in partial mode.
    #[arg(long, default_value_t = 50)]
    pub iterations: u32,

    /// Symmetry family applied to the designed unit.
    #[arg(long, value_enum, default_value = "none")]
    pub symmetry: SymmetryMode,

    /// Symmetry order (e.g. 3 for c3).
    #[arg(long, default_value_t = 1)]
    pub order: u32,

    /// Comma-separated hotspot residues, e.g. `A30,A33`.
    #[arg(long, value_name = "RESIDUES")]
    pub hotspot: Option<String>,

    /// Restrict contig fixup to these chains of the input structure.
    #[arg(long, value_name = "CHAINS")]
    pub chains: Option<String>,

    /// Independent designs per contig spec.
    #[arg(long, default_value_t = 1)]
    pub num_designs: u32,

    /// Disable the oligomer-contact guiding potential under symmetry.
    #[arg(long)]
    pub no_potential: bool,

    /// Comma-separated GPU device indices, assigned round-robin across runs
    /// and exported to each child as `CUDA_VISIBLE_DEVICES`.
    #[arg(long, value_name = "IDS")]
    pub gpus: Option<String>,

    /// Maximum number of runs executing at once (overrides config).
    #[arg(long, value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Per-run wall-clock limit in hours (overrides config).
    #[arg(long, value_name = "HOURS")]
    pub timeout_hours: Option<f64>,

    /// Print the planned runs without executing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
