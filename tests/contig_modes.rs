use std::error::Error;

use rand::rngs::StdRng;
use rand::SeedableRng;

use rfpilot::contig::{
    classify, fix_contigs, fix_partial_contigs, partial_iterations, tokenize, ContigMode,
};
use rfpilot::pdb::chain_ranges;

type TestResult = Result<(), Box<dyn Error>>;

fn atom_line(serial: u32, chain: char, resi: i32) -> String {
    format!(
        "ATOM  {serial:>5}  CA  GLY {chain}{resi:>4}      11.104  13.207   2.100  1.00  0.00           C"
    )
}

fn two_chain_pdb() -> String {
    let mut lines = Vec::new();
    for (i, resi) in (3..=12).enumerate() {
        lines.push(atom_line(i as u32 + 1, 'A', resi));
    }
    for (i, resi) in (1..=6).enumerate() {
        lines.push(atom_line(i as u32 + 20, 'B', resi));
    }
    lines.join("\n")
}

#[test]
fn free_fixed_and_partial_specs_classify_deterministically() -> TestResult {
    let free = classify(&tokenize("100"));
    assert_eq!(free.mode, ContigMode::Free);
    assert!(free.fixed_chains.is_empty());

    let fixed = classify(&tokenize("A1-10/20"));
    assert_eq!(fixed.mode, ContigMode::Fixed);
    assert_eq!(fixed.fixed_chains, vec!['A']);

    // No free segment anywhere means a partial resample.
    let partial = classify(&tokenize("A1-10"));
    assert_eq!(partial.mode, ContigMode::Partial);

    let empty = classify(&tokenize(""));
    assert_eq!(empty.mode, ContigMode::Partial);

    Ok(())
}

#[test]
fn commas_and_whitespace_both_separate_tokens() -> TestResult {
    assert_eq!(tokenize("A1-10/20 30"), vec!["A1-10/20", "30"]);
    assert_eq!(tokenize("A1-10/20,30"), vec!["A1-10/20", "30"]);

    let multi = classify(&tokenize("A1-10/20 30"));
    assert_eq!(multi.mode, ContigMode::Fixed);

    Ok(())
}

#[test]
fn fixed_chains_are_collected_in_first_seen_order() -> TestResult {
    let class = classify(&tokenize("B1-5/10/A2-4 C1-3/5"));
    assert_eq!(class.fixed_chains, vec!['B', 'A', 'C']);
    Ok(())
}

#[test]
fn partial_mode_rescales_iterations() -> TestResult {
    assert_eq!(partial_iterations(50), 20);
    assert_eq!(partial_iterations(200), 80);
    assert_eq!(partial_iterations(0), 0);
    Ok(())
}

#[test]
fn bare_chain_refs_expand_to_the_full_chain() -> TestResult {
    let pdb = two_chain_pdb();
    let ranges = chain_ranges(&pdb, None);
    let mut rng = StdRng::seed_from_u64(1);

    let fixed = fix_contigs(&["A/20/B".to_string()], Some(&ranges), &mut rng)?;
    assert_eq!(fixed, vec!["A3-12/20/B1-6".to_string()]);

    Ok(())
}

#[test]
fn fixed_ranges_are_clamped_to_existing_residues() -> TestResult {
    let pdb = two_chain_pdb();
    let ranges = chain_ranges(&pdb, None);
    let mut rng = StdRng::seed_from_u64(1);

    let fixed = fix_contigs(&["A1-20/15".to_string()], Some(&ranges), &mut rng)?;
    assert_eq!(fixed, vec!["A3-12/15".to_string()]);

    // A range entirely outside the chain is an error, not silently empty.
    assert!(fix_contigs(&["A100-120/15".to_string()], Some(&ranges), &mut rng).is_err());

    // So is a reference to a chain the structure does not have.
    assert!(fix_contigs(&["C1-5/15".to_string()], Some(&ranges), &mut rng).is_err());

    Ok(())
}

#[test]
fn free_length_ranges_resolve_within_bounds() -> TestResult {
    let mut rng = StdRng::seed_from_u64(7);
    let fixed = fix_contigs(&["80-120".to_string()], None, &mut rng)?;
    let len: u32 = fixed[0].parse()?;
    assert!((80..=120).contains(&len));

    // An exact length passes through unchanged.
    let exact = fix_contigs(&["100".to_string()], None, &mut rng)?;
    assert_eq!(exact, vec!["100".to_string()]);

    Ok(())
}

#[test]
fn partial_contigs_cover_every_chain() -> TestResult {
    let pdb = two_chain_pdb();

    let all = fix_partial_contigs(&chain_ranges(&pdb, None));
    assert_eq!(all, vec!["A3-12".to_string(), "B1-6".to_string()]);

    // The chain filter restricts coverage.
    let only_b = fix_partial_contigs(&chain_ranges(&pdb, Some(&['B'])));
    assert_eq!(only_b, vec!["B1-6".to_string()]);

    Ok(())
}
