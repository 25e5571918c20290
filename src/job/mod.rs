// src/job/mod.rs

//! Batch planning and command-line construction for the two wrapped
//! binaries.
//!
//! - [`plan`] expands user parameters into the (contig × design) grid of
//!   independent runs with unique output folders.
//! - [`diffusion`] builds the Hydra-style option string for the diffusion
//!   binary.
//! - [`design`] builds the flag string for the sequence-design binary.

pub mod design;
pub mod diffusion;
pub mod plan;

pub use design::{build_design_command, DesignParams};
pub use diffusion::{build_diffusion_command, DiffusionCommand, DiffusionParams};
pub use plan::{default_batch_name, plan_batch, split_contig_specs, BatchPlan, JobSpec};
