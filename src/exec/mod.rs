// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] runs a single shell command via `tokio::process::Command`,
//!   streaming its output into the log and mapping the exit status to an
//!   outcome.
//! - [`runner`] owns the strictly sequential per-run pipeline: write the
//!   input structure, run diffusion, renumber the emitted PDB files, then
//!   run the sequence-design stage.

pub mod command;
pub mod runner;

pub use command::{run_shell, CommandResult, ShellJob};
pub use runner::{run_job, RunContext};
