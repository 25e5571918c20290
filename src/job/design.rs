// src/job/design.rs

use std::path::Path;

use crate::config::DesignSection;

/// Inputs for one sequence-design invocation on a produced structure.
#[derive(Debug)]
pub struct DesignParams<'a> {
    /// Structure emitted by the diffusion stage (`{run}/output_0.pdb`).
    pub pdb: &'a Path,
    /// Run directory the design outputs land in.
    pub loc: &'a Path,
    /// Final contig tokens of the run, joined with `:` on the command line.
    pub contigs: &'a [String],
    pub copies: usize,
}

/// Build the full shell command for the sequence-design binary.
pub fn build_design_command(cfg: &DesignSection, params: &DesignParams<'_>) -> String {
    let mut opts = vec![
        format!("--pdb={}", params.pdb.display()),
        format!("--loc={}", params.loc.display()),
        format!("--contig={}", params.contigs.join(":")),
        format!("--copies={}", params.copies),
        format!("--num_seqs={}", cfg.num_seqs),
        format!("--num_recycles={}", cfg.num_recycles),
        format!("--rm_aa={}", cfg.rm_aa),
        format!("--mpnn_sampling_temp={}", cfg.sampling_temp),
        format!("--num_designs={}", cfg.num_designs),
    ];

    if cfg.initial_guess {
        opts.push("--initial_guess".to_string());
    }
    if cfg.use_multimer {
        opts.push("--use_multimer".to_string());
    }

    format!("{} {}", cfg.command, opts.join(" "))
}
