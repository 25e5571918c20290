// src/symmetry.rs

//! Symmetry-mode handling.
//!
//! A symmetry constraint replicates the designed unit `copies` times around
//! an axis: cyclic order n gives `c{n}` with n copies, dihedral order n gives
//! `d{n}` with 2n copies. Under symmetry the diffusion binary needs its
//! symmetry config plus (optionally) an oligomer-contact guiding potential,
//! and the contig token list is replicated once per copy.

use clap::ValueEnum;

/// Symmetry family as exposed on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SymmetryMode {
    #[default]
    None,
    Cyclic,
    Dihedral,
}

/// A resolved symmetry constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symmetry {
    /// Tag passed as `inference.symmetry=` (e.g. `c3`, `d2`).
    pub tag: String,
    /// Number of copies of the designed unit.
    pub copies: usize,
}

impl SymmetryMode {
    /// Resolve mode + order into a concrete constraint; `None` (or order 0)
    /// means an asymmetric run with a single copy.
    pub fn resolve(self, order: u32) -> Option<Symmetry> {
        if order == 0 {
            return None;
        }
        match self {
            SymmetryMode::None => None,
            SymmetryMode::Cyclic => Some(Symmetry {
                tag: format!("c{order}"),
                copies: order as usize,
            }),
            SymmetryMode::Dihedral => Some(Symmetry {
                tag: format!("d{order}"),
                copies: 2 * order as usize,
            }),
        }
    }
}

/// Option block prepended to the diffusion command under symmetry.
pub fn symmetry_opts(sym: &Symmetry, add_potential: bool) -> Vec<String> {
    let mut opts = vec![
        "--config-name symmetry".to_string(),
        format!("inference.symmetry={}", sym.tag),
    ];
    if add_potential {
        opts.push(
            "'potentials.guiding_potentials=[\"type:olig_contacts,weight_intra:1,weight_inter:0.1\"]'"
                .to_string(),
        );
        opts.push("potentials.olig_intra_all=True".to_string());
        opts.push("potentials.olig_inter_all=True".to_string());
        opts.push("potentials.guide_scale=2".to_string());
        opts.push("potentials.guide_decay=quadratic".to_string());
    }
    opts
}

/// Replicate the contig token list once per symmetry copy.
pub fn replicate_contigs(contigs: &[String], copies: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(contigs.len() * copies);
    for _ in 0..copies {
        out.extend_from_slice(contigs);
    }
    out
}
