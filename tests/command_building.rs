use std::error::Error;
use std::path::Path;

use rfpilot::config::DesignSection;
use rfpilot::contig::ContigMode;
use rfpilot::job::{build_design_command, build_diffusion_command, DesignParams, DiffusionParams};
use rfpilot::symmetry::SymmetryMode;

type TestResult = Result<(), Box<dyn Error>>;

const PREFIX: &str = "python RFdiffusion/run_inference.py";

fn free_params<'a>(run_path: &'a Path, contigs: Vec<String>) -> DiffusionParams<'a> {
    DiffusionParams {
        run_path,
        num_designs: 1,
        input_pdb: None,
        mode: ContigMode::Free,
        iterations: 50,
        hotspot: None,
        symmetry: None,
        add_potential: true,
        contigs,
    }
}

#[test]
fn free_mode_command_has_the_expected_shape() -> TestResult {
    let run_path = Path::new("/data/outputs/batch/run1");
    let params = free_params(run_path, vec!["100".to_string()]);
    let cmd = build_diffusion_command(PREFIX, &params);

    assert_eq!(
        cmd.command,
        "python RFdiffusion/run_inference.py \
         inference.output_prefix=/data/outputs/batch/run1/output \
         inference.num_designs=1 \
         diffuser.T=50 \
         'contigmap.contigs=[100]' \
         inference.dump_pdb=True \
         inference.dump_pdb_path='/tmp'"
    );
    assert_eq!(cmd.copies, 1);

    Ok(())
}

#[test]
fn fixed_mode_adds_the_input_structure() -> TestResult {
    let run_path = Path::new("/out/r");
    let input = run_path.join("input.pdb");
    let params = DiffusionParams {
        input_pdb: Some(&input),
        mode: ContigMode::Fixed,
        contigs: vec!["A3-12/20".to_string()],
        ..free_params(run_path, Vec::new())
    };
    let cmd = build_diffusion_command(PREFIX, &params);

    assert!(cmd.command.contains("inference.input_pdb=/out/r/input.pdb"));
    assert!(cmd.command.contains("diffuser.T=50"));
    assert!(cmd.command.contains("'contigmap.contigs=[A3-12/20]'"));

    Ok(())
}

#[test]
fn partial_mode_uses_the_rescaled_iteration_flag() -> TestResult {
    let run_path = Path::new("/out/r");
    let input = run_path.join("input.pdb");
    let params = DiffusionParams {
        input_pdb: Some(&input),
        mode: ContigMode::Partial,
        contigs: vec!["A1-50".to_string()],
        ..free_params(run_path, Vec::new())
    };
    let cmd = build_diffusion_command(PREFIX, &params);

    assert!(cmd.command.contains("diffuser.partial_T=20"));
    assert!(!cmd.command.contains("diffuser.T=50"));

    Ok(())
}

#[test]
fn hotspots_are_bracketed() -> TestResult {
    let run_path = Path::new("/out/r");
    let params = DiffusionParams {
        hotspot: Some("A30,A33"),
        ..free_params(run_path, vec!["100".to_string()])
    };
    let cmd = build_diffusion_command(PREFIX, &params);

    assert!(cmd.command.contains("ppi.hotspot_res=[A30,A33]"));

    Ok(())
}

#[test]
fn symmetry_prepends_its_block_and_replicates_contigs() -> TestResult {
    let run_path = Path::new("/out/r");
    let sym = SymmetryMode::Cyclic.resolve(3).unwrap();
    let params = DiffusionParams {
        symmetry: Some(&sym),
        ..free_params(run_path, vec!["60".to_string()])
    };
    let cmd = build_diffusion_command(PREFIX, &params);

    // The symmetry block comes right after the command prefix.
    assert!(cmd.command.starts_with(
        "python RFdiffusion/run_inference.py --config-name symmetry inference.symmetry=c3"
    ));
    assert!(cmd.command.contains("potentials.guide_decay=quadratic"));
    assert!(cmd.command.contains("'contigmap.contigs=[60 60 60]'"));
    assert_eq!(cmd.contigs.len(), 3);
    assert_eq!(cmd.copies, 3);

    Ok(())
}

#[test]
fn disabling_the_potential_keeps_only_the_symmetry_config() -> TestResult {
    let run_path = Path::new("/out/r");
    let sym = SymmetryMode::Dihedral.resolve(2).unwrap();
    let params = DiffusionParams {
        symmetry: Some(&sym),
        add_potential: false,
        ..free_params(run_path, vec!["60".to_string()])
    };
    let cmd = build_diffusion_command(PREFIX, &params);

    assert!(cmd.command.contains("inference.symmetry=d2"));
    assert!(!cmd.command.contains("guiding_potentials"));
    assert_eq!(cmd.copies, 4);

    Ok(())
}

#[test]
fn design_command_lists_every_flag_in_order() -> TestResult {
    let cfg = DesignSection::default();
    let params = DesignParams {
        pdb: Path::new("/out/r/output_0.pdb"),
        loc: Path::new("/out/r"),
        contigs: &["A3-12/20".to_string(), "A3-12/20".to_string()],
        copies: 2,
    };
    let cmd = build_design_command(&cfg, &params);

    assert_eq!(
        cmd,
        "python -m colabdesign.rf.designability_test \
         --pdb=/out/r/output_0.pdb \
         --loc=/out/r \
         --contig=A3-12/20:A3-12/20 \
         --copies=2 \
         --num_seqs=8 \
         --num_recycles=1 \
         --rm_aa=C \
         --mpnn_sampling_temp=0.1 \
         --num_designs=1"
    );

    Ok(())
}

#[test]
fn design_flags_are_appended_when_enabled() -> TestResult {
    let cfg = DesignSection {
        initial_guess: true,
        use_multimer: true,
        ..DesignSection::default()
    };
    let params = DesignParams {
        pdb: Path::new("/out/r/output_0.pdb"),
        loc: Path::new("/out/r"),
        contigs: &["100".to_string()],
        copies: 1,
    };
    let cmd = build_design_command(&cfg, &params);

    assert!(cmd.ends_with("--initial_guess --use_multimer"));

    Ok(())
}
