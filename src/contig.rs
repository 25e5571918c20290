// src/contig.rs

//! Contig string handling.
//!
//! A contig spec is a whitespace-separated list of tokens; each token is a
//! `/`-separated list of segments. A segment is either *fixed* — a chain
//! letter plus residue range taken from an input structure (`A1-10`, or a
//! bare `A` for the whole chain) — or *free*, a generated-length count
//! (`20`) or length range (`80-120`).
//!
//! The segment shapes decide the structural mode of a run:
//! - no tokens, or no free segment anywhere: `partial` (resample an
//!   existing structure)
//! - at least one fixed segment: `fixed` (scaffold around fixed regions)
//! - otherwise: `free` (unconditional generation)

use std::fmt;
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use rand::Rng;
use regex::Regex;
use tracing::debug;

use crate::pdb::ChainRanges;

const CHAIN_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// PDB residue columns are four characters wide.
const MIN_RESI: i32 = -999;
const MAX_RESI: i32 = 9999;

fn check_resi_width(seg: &str, resi: i32) -> Result<()> {
    if !(MIN_RESI..=MAX_RESI).contains(&resi) {
        bail!("residue number {resi} in segment '{seg}' does not fit a PDB record");
    }
    Ok(())
}

/// Structural mode of a run, derived from the contig spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContigMode {
    Free,
    Fixed,
    Partial,
}

impl fmt::Display for ContigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContigMode::Free => write!(f, "free"),
            ContigMode::Fixed => write!(f, "fixed"),
            ContigMode::Partial => write!(f, "partial"),
        }
    }
}

/// Result of classifying a token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mode: ContigMode,
    /// Chain letters referenced by fixed segments, in first-seen order.
    pub fixed_chains: Vec<char>,
}

/// Split a contig spec into tokens (commas count as whitespace).
pub fn tokenize(spec: &str) -> Vec<String> {
    spec.replace(',', " ")
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

/// Classify tokens into a structural mode by inspecting the dash-prefix of
/// every segment: an alphabetic first character marks a fixed segment, an
/// all-digit prefix marks a free one.
pub fn classify(tokens: &[String]) -> Classification {
    let mut is_fixed = false;
    let mut is_free = false;
    let mut fixed_chains = Vec::new();

    for token in tokens {
        for seg in token.split('/') {
            let prefix = seg.split('-').next().unwrap_or("");
            if let Some(first) = prefix.chars().next() {
                if first.is_alphabetic() {
                    is_fixed = true;
                    if !fixed_chains.contains(&first) {
                        fixed_chains.push(first);
                    }
                }
            }
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
                is_free = true;
            }
        }
    }

    let mode = if tokens.is_empty() || !is_free {
        ContigMode::Partial
    } else if is_fixed {
        ContigMode::Fixed
    } else {
        ContigMode::Free
    };

    Classification { mode, fixed_chains }
}

/// One parsed contig segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// `A`, `A5`, or `A5-10`: residues of an input chain. `range` is `None`
    /// for a bare chain reference.
    Fixed {
        chain: char,
        range: Option<(i32, i32)>,
    },
    /// `20` or `80-120`: a generated stretch of `min..=max` residues.
    Free { min: u32, max: u32 },
}

/// Parse a single segment of a contig token.
pub fn parse_segment(seg: &str) -> Result<Segment> {
    let first = seg
        .chars()
        .next()
        .ok_or_else(|| anyhow!("empty contig segment"))?;

    if first.is_alphabetic() {
        let rest = &seg[first.len_utf8()..];
        if rest.is_empty() {
            return Ok(Segment::Fixed {
                chain: first,
                range: None,
            });
        }
        let (start, end) = parse_range_i32(rest)
            .with_context(|| format!("bad residue range in contig segment '{seg}'"))?;
        if start > end {
            bail!("contig segment '{seg}' has start > end");
        }
        Ok(Segment::Fixed {
            chain: first,
            range: Some((start, end)),
        })
    } else {
        let (min, max) = parse_range_u32(seg)
            .with_context(|| format!("bad length in contig segment '{seg}'"))?;
        if min > max {
            bail!("contig segment '{seg}' has min > max");
        }
        Ok(Segment::Free { min, max })
    }
}

fn parse_range_i32(s: &str) -> Result<(i32, i32)> {
    match s.split_once('-') {
        Some((a, b)) => Ok((a.parse()?, b.parse()?)),
        None => {
            let v: i32 = s.parse()?;
            Ok((v, v))
        }
    }
}

fn parse_range_u32(s: &str) -> Result<(u32, u32)> {
    match s.split_once('-') {
        Some((a, b)) => Ok((a.parse()?, b.parse()?)),
        None => {
            let v: u32 = s.parse()?;
            Ok((v, v))
        }
    }
}

/// Normalize tokens against the input structure:
///
/// - bare chain refs become the chain's full residue range
/// - fixed ranges are clamped to residues the structure actually has
/// - free length ranges are resolved to one sampled length, so that the
///   diffusion input and the later renumbering agree within this run
pub fn fix_contigs(
    tokens: &[String],
    pdb: Option<&ChainRanges>,
    rng: &mut impl Rng,
) -> Result<Vec<String>> {
    let mut fixed = Vec::with_capacity(tokens.len());
    for token in tokens {
        let mut parts = Vec::new();
        for seg in token.split('/') {
            let part = match parse_segment(seg)? {
                Segment::Fixed { chain, range } => {
                    let Some(pdb) = pdb else {
                        bail!("contig segment '{seg}' needs an input structure (--pdb)");
                    };
                    let (min, max) = pdb.get(chain).ok_or_else(|| {
                        anyhow!(
                            "contig segment '{seg}' references chain '{chain}' not present in the input structure"
                        )
                    })?;
                    let (start, end) = match range {
                        Some((s, e)) => {
                            let start = s.max(min);
                            let end = e.min(max);
                            if start > end {
                                bail!(
                                    "contig segment '{seg}' lies outside chain {chain} ({min}-{max})"
                                );
                            }
                            (start, end)
                        }
                        None => (min, max),
                    };
                    format!("{chain}{start}-{end}")
                }
                Segment::Free { min, max } => {
                    let len = if min == max {
                        min
                    } else {
                        let len = rng.gen_range(min..=max);
                        debug!(segment = %seg, sampled = len, "resolved free length range");
                        len
                    };
                    len.to_string()
                }
            };
            parts.push(part);
        }
        fixed.push(parts.join("/"));
    }
    Ok(fixed)
}

/// Partial mode resamples the whole structure: derive one full-coverage
/// token per chain.
pub fn fix_partial_contigs(pdb: &ChainRanges) -> Vec<String> {
    pdb.chains()
        .filter_map(|c| pdb.get(c).map(|(min, max)| format!("{c}{min}-{max}")))
        .collect()
}

/// Partial-mode iteration rescale: `diffuser.partial_T = 80 * T / 200`.
pub fn partial_iterations(iterations: u32) -> u32 {
    (80u64 * iterations as u64 / 200) as u32
}

/// Per-residue (chain, residue number) layout implied by fixed-up tokens.
///
/// Each token becomes one chain (A, B, C, ... by position). Fixed segments
/// keep their original numbering; free segments continue sequentially from
/// the previous segment. Requires tokens already passed through
/// [`fix_contigs`] so every free length is concrete.
pub fn residue_layout(tokens: &[String]) -> Result<Vec<(char, i32)>> {
    if tokens.len() > CHAIN_LETTERS.len() {
        bail!(
            "contig layout needs {} chains but only {} letters are available",
            tokens.len(),
            CHAIN_LETTERS.len()
        );
    }

    let mut layout = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        let chain = CHAIN_LETTERS[idx] as char;
        let mut next = 1i32;
        for seg in token.split('/') {
            match parse_segment(seg)? {
                Segment::Fixed {
                    range: Some((start, end)),
                    ..
                } => {
                    check_resi_width(seg, start)?;
                    check_resi_width(seg, end)?;
                    for resi in start..=end {
                        layout.push((chain, resi));
                    }
                    next = end + 1;
                }
                Segment::Fixed { range: None, .. } => {
                    bail!("unresolved bare chain ref '{seg}' in fixed-up contig");
                }
                Segment::Free { min, max } => {
                    if min != max {
                        bail!("unresolved free length range '{seg}' in fixed-up contig");
                    }
                    if min > MAX_RESI as u32 {
                        bail!("free segment '{seg}' is longer than PDB numbering allows");
                    }
                    check_resi_width(seg, next + min as i32 - 1)?;
                    for resi in next..next + min as i32 {
                        layout.push((chain, resi));
                    }
                    next += min as i32;
                }
            }
        }
    }
    Ok(layout)
}

static HOTSPOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]\d+$").expect("hotspot regex"));

/// Check a comma-separated hotspot list (`A30,A33`).
pub fn validate_hotspot(hotspot: &str) -> Result<()> {
    for entry in hotspot.split(',') {
        let entry = entry.trim();
        if entry.is_empty() || !HOTSPOT_RE.is_match(entry) {
            bail!("bad hotspot residue '{entry}' (expected e.g. A30)");
        }
    }
    Ok(())
}

/// Parse a `--chains A,B` filter into chain letters.
pub fn parse_chain_filter(chains: Option<&str>) -> Option<Vec<char>> {
    let chains = chains?.trim();
    if chains.is_empty() {
        return None;
    }
    let parsed: Vec<char> = chains
        .split(',')
        .filter_map(|s| s.trim().chars().next())
        .collect();
    if parsed.is_empty() { None } else { Some(parsed) }
}
