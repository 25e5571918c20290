// src/job/diffusion.rs

use std::path::Path;

use crate::contig::{partial_iterations, ContigMode};
use crate::symmetry::{replicate_contigs, symmetry_opts, Symmetry};

/// Inputs for one diffusion invocation, already resolved: the mode is
/// classified, the contig tokens are fixed up, and the input structure (if
/// any) has been written into the run directory.
#[derive(Debug)]
pub struct DiffusionParams<'a> {
    pub run_path: &'a Path,
    pub num_designs: u32,
    /// Structure file inside the run directory, for fixed/partial modes.
    pub input_pdb: Option<&'a Path>,
    pub mode: ContigMode,
    /// Requested iteration count; partial mode rescales it.
    pub iterations: u32,
    pub hotspot: Option<&'a str>,
    pub symmetry: Option<&'a Symmetry>,
    pub add_potential: bool,
    /// Fixed-up contig tokens, not yet replicated for symmetry.
    pub contigs: Vec<String>,
}

/// A ready-to-run diffusion invocation.
#[derive(Debug, Clone)]
pub struct DiffusionCommand {
    /// Full shell command line.
    pub command: String,
    /// Final token list (after symmetry replication); the renumbering step
    /// and the design stage both need it.
    pub contigs: Vec<String>,
    pub copies: usize,
}

/// Build the Hydra-style option list and the final command string.
///
/// Option order matters to keep command lines reproducible across runs:
/// symmetry options are prepended as a block, the contig map goes after all
/// mode-dependent options, and the dump flags close the line.
pub fn build_diffusion_command(prefix: &str, params: &DiffusionParams<'_>) -> DiffusionCommand {
    let mut opts = vec![
        format!("inference.output_prefix={}/output", params.run_path.display()),
        format!("inference.num_designs={}", params.num_designs),
    ];

    if let Some(pdb) = params.input_pdb {
        opts.push(format!("inference.input_pdb={}", pdb.display()));
    }

    match params.mode {
        ContigMode::Partial => {
            opts.push(format!(
                "diffuser.partial_T={}",
                partial_iterations(params.iterations)
            ));
        }
        ContigMode::Free | ContigMode::Fixed => {
            opts.push(format!("diffuser.T={}", params.iterations));
        }
    }

    if let Some(hotspot) = params.hotspot {
        if !hotspot.is_empty() {
            opts.push(format!("ppi.hotspot_res=[{hotspot}]"));
        }
    }

    let (contigs, copies) = match params.symmetry {
        Some(sym) => {
            let mut prefixed = symmetry_opts(sym, params.add_potential);
            prefixed.append(&mut opts);
            opts = prefixed;
            (replicate_contigs(&params.contigs, sym.copies), sym.copies)
        }
        None => (params.contigs.clone(), 1),
    };

    opts.push(format!("'contigmap.contigs=[{}]'", contigs.join(" ")));
    opts.push("inference.dump_pdb=True".to_string());
    opts.push("inference.dump_pdb_path='/tmp'".to_string());

    DiffusionCommand {
        command: format!("{} {}", prefix, opts.join(" ")),
        contigs,
        copies,
    }
}
