// src/pdb.rs

//! Minimal fixed-column PDB text handling.
//!
//! The glue never interprets coordinates; it only needs two things from a
//! structure file: which residues each chain has (to fix up contig tokens),
//! and the ability to rewrite chain identifiers and residue numbers in the
//! files the diffusion binary emits. Those files come out as a single
//! renumbered chain, so the intended layout from the contig spec has to be
//! written back in.
//!
//! Column layout for ATOM/HETATM/TER records (0-based byte offsets):
//! chain id at 21, residue sequence number right-justified in 22..26.

use std::collections::BTreeMap;

use tracing::warn;

const CHAIN_COL: usize = 21;
const RESI_COLS: std::ops::Range<usize> = 22..26;

/// Residue extent of each chain in a structure, from ATOM records.
#[derive(Debug, Clone, Default)]
pub struct ChainRanges {
    ranges: BTreeMap<char, (i32, i32)>,
}

impl ChainRanges {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// (min, max) residue numbers seen for a chain.
    pub fn get(&self, chain: char) -> Option<(i32, i32)> {
        self.ranges.get(&chain).copied()
    }

    /// Chain letters in alphabetical order.
    pub fn chains(&self) -> impl Iterator<Item = char> + '_ {
        self.ranges.keys().copied()
    }
}

/// Scan ATOM/HETATM records for per-chain residue ranges, optionally
/// restricted to a chain filter.
pub fn chain_ranges(pdb: &str, chains: Option<&[char]>) -> ChainRanges {
    let mut ranges: BTreeMap<char, (i32, i32)> = BTreeMap::new();

    for line in pdb.lines() {
        if !(line.starts_with("ATOM") || line.starts_with("HETATM"))
            || line.len() < RESI_COLS.end
        {
            continue;
        }
        let bytes = line.as_bytes();
        let chain = bytes[CHAIN_COL] as char;
        if let Some(filter) = chains {
            if !filter.contains(&chain) {
                continue;
            }
        }
        let Ok(resi) = line[RESI_COLS].trim().parse::<i32>() else {
            continue;
        };
        ranges
            .entry(chain)
            .and_modify(|(min, max)| {
                *min = (*min).min(resi);
                *max = (*max).max(resi);
            })
            .or_insert((resi, resi));
    }

    ChainRanges { ranges }
}

/// Rewrite chain ids and residue numbers of ATOM/HETATM/TER records so the
/// i-th residue of each model carries `layout[i]`.
///
/// Residue boundaries are detected by (chain, residue number) changes;
/// `MODEL` records reset the count, so multi-model trajectory files are
/// renumbered per model. Records past the end of the layout and all other
/// lines are left untouched.
pub fn renumber(pdb: &str, layout: &[(char, i32)]) -> String {
    let mut out = String::with_capacity(pdb.len());
    let mut residue_idx: usize = 0;
    let mut last_key: Option<(char, String)> = None;
    let mut warned = false;

    for line in pdb.lines() {
        let rewritten = if line.starts_with("MODEL") {
            residue_idx = 0;
            last_key = None;
            None
        } else if is_residue_record(line) {
            let bytes = line.as_bytes();
            let key = (bytes[CHAIN_COL] as char, line[RESI_COLS].to_string());
            // TER carries the numbering of the residue it closes.
            let advance = !line.starts_with("TER");
            if advance {
                match &last_key {
                    Some(prev) if *prev == key => {}
                    Some(_) => residue_idx += 1,
                    None => {}
                }
                last_key = Some(key);
            }
            match layout.get(residue_idx) {
                Some(&(chain, resi)) => Some(rewrite_record(line, chain, resi)),
                None => {
                    if !warned {
                        warn!(
                            residues = layout.len(),
                            "structure has more residues than the contig layout; leaving the rest unchanged"
                        );
                        warned = true;
                    }
                    None
                }
            }
        } else {
            None
        };

        match rewritten {
            Some(s) => out.push_str(&s),
            None => out.push_str(line),
        }
        out.push('\n');
    }

    out
}

fn is_residue_record(line: &str) -> bool {
    (line.starts_with("ATOM") || line.starts_with("HETATM") || line.starts_with("TER"))
        && line.len() >= RESI_COLS.end
}

fn rewrite_record(line: &str, chain: char, resi: i32) -> String {
    let field = format!("{resi:>4}");
    if field.len() > RESI_COLS.len() {
        // Numbers outside -999..=9999 do not fit the fixed-width column.
        warn!(resi, "residue number does not fit a PDB record; leaving line unchanged");
        return line.to_string();
    }
    let mut bytes = line.as_bytes().to_vec();
    bytes[CHAIN_COL] = chain as u8;
    bytes[RESI_COLS].copy_from_slice(field.as_bytes());
    // Both inputs are ASCII PDB records.
    String::from_utf8(bytes).unwrap_or_else(|_| line.to_string())
}
