use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use rfpilot::batch::run_batch;
use rfpilot::config::DesignSection;
use rfpilot::exec::runner::{run_job, RunContext};
use rfpilot::job::plan::{plan_batch, JobSpec};
use rfpilot::report::RunResult;
use rfpilot::symmetry::SymmetryMode;

type TestResult = Result<(), Box<dyn Error>>;

fn atom_line(serial: u32, chain: char, resi: i32) -> String {
    format!(
        "ATOM  {serial:>5}  CA  GLY {chain}{resi:>4}      11.104  13.207   2.100  1.00  0.00           C"
    )
}

/// Stand-in for the diffusion binary: copies a template structure to the
/// requested output prefix and records its GPU assignment.
fn write_fake_diffusion(models_dir: &Path, template_residues: i32) -> TestResult {
    let template: String = (1..=template_residues)
        .map(|r| atom_line(r as u32, 'A', r))
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(models_dir.join("template.pdb"), template)?;
    fs::write(
        models_dir.join("fake_diffusion.sh"),
        r#"#!/bin/sh
p=""
for a in "$@"; do
  case "$a" in
    inference.output_prefix=*) p="${a#inference.output_prefix=}" ;;
  esac
done
[ -n "$p" ] || exit 1
cp template.pdb "${p}_0.pdb"
echo "$CUDA_VISIBLE_DEVICES" > "${p}_gpu.txt"
"#,
    )?;
    Ok(())
}

fn context(models_dir: &Path, diffusion_command: &str) -> RunContext {
    RunContext {
        models_dir: models_dir.to_path_buf(),
        diffusion_command: diffusion_command.to_string(),
        design: DesignSection {
            command: "true".to_string(),
            ..DesignSection::default()
        },
        iterations: 50,
        symmetry: None,
        hotspot: None,
        chain_filter: None,
        add_potential: true,
        designs_per_run: 1,
        pdb_content: None,
        timeout: Duration::from_secs(30),
    }
}

fn spec(run_path: &Path, contig_spec: &str, gpu: Option<&str>) -> JobSpec {
    JobSpec {
        folder_name: run_path.file_name().unwrap().to_string_lossy().into_owned(),
        run_path: run_path.to_path_buf(),
        contig_spec: contig_spec.to_string(),
        design_index: 0,
        gpu: gpu.map(str::to_string),
    }
}

#[tokio::test]
async fn successful_run_renumbers_outputs_and_runs_design() -> TestResult {
    let dir = tempfile::tempdir()?;
    let models_dir = dir.path().join("models");
    fs::create_dir_all(&models_dir)?;
    write_fake_diffusion(&models_dir, 2)?;

    let ctx = RunContext {
        symmetry: SymmetryMode::Cyclic.resolve(2),
        ..context(&models_dir, "sh fake_diffusion.sh")
    };
    let run_path = dir.path().join("batch").join("run0");
    let report = run_job(Arc::new(ctx), spec(&run_path, "1", Some("0"))).await;

    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.contigs, vec!["1".to_string(), "1".to_string()]);
    assert_eq!(report.copies, 2);
    assert!(report.command.contains("'contigmap.contigs=[1 1]'"));

    // The emitted single chain was renumbered into the two symmetric copies.
    let output = fs::read_to_string(run_path.join("output_0.pdb"))?;
    let chains: Vec<char> = output
        .lines()
        .filter(|l| l.starts_with("ATOM"))
        .map(|l| l.as_bytes()[21] as char)
        .collect();
    assert_eq!(chains, vec!['A', 'B']);

    // GPU assignment reached the child process.
    let gpu = fs::read_to_string(run_path.join("output_gpu.txt"))?;
    assert_eq!(gpu.trim(), "0");

    // The design stage ran and succeeded.
    let design = report.design.expect("design stage should have run");
    assert_eq!(design.result, RunResult::Success);
    assert!(design.command.contains("--copies=2"));

    Ok(())
}

#[tokio::test]
async fn failed_diffusion_skips_the_design_stage() -> TestResult {
    let dir = tempfile::tempdir()?;
    let models_dir = dir.path().join("models");
    fs::create_dir_all(&models_dir)?;

    let ctx = context(&models_dir, "false");
    let run_path = dir.path().join("batch").join("run0");
    let report = run_job(Arc::new(ctx), spec(&run_path, "100", None)).await;

    assert_eq!(report.result, RunResult::Failed);
    assert!(report.design.is_none());
    // The failed report still carries the full command line.
    assert!(report.command.starts_with("false inference.output_prefix="));
    assert!(report.command.contains("diffuser.T=50"));

    Ok(())
}

#[tokio::test]
async fn fixed_mode_writes_the_input_structure_into_the_run() -> TestResult {
    let dir = tempfile::tempdir()?;
    let models_dir = dir.path().join("models");
    fs::create_dir_all(&models_dir)?;
    write_fake_diffusion(&models_dir, 12)?;

    let input: String = (3..=12)
        .map(|r| atom_line(r as u32, 'A', r))
        .collect::<Vec<_>>()
        .join("\n");
    let ctx = RunContext {
        pdb_content: Some(input),
        ..context(&models_dir, "sh fake_diffusion.sh")
    };
    let run_path = dir.path().join("batch").join("run0");
    let report = run_job(Arc::new(ctx), spec(&run_path, "A/2", None)).await;

    assert_eq!(report.result, RunResult::Success);
    // Bare chain ref expanded against the input structure.
    assert_eq!(report.contigs, vec!["A3-12/2".to_string()]);
    assert!(run_path.join("input.pdb").is_file());
    assert!(report.command.contains("inference.input_pdb="));

    Ok(())
}

#[tokio::test]
async fn batch_collects_reports_in_plan_order_and_writes_json() -> TestResult {
    let dir = tempfile::tempdir()?;
    let models_dir = dir.path().join("models");
    let outputs_dir = dir.path().join("outputs");
    fs::create_dir_all(&models_dir)?;
    write_fake_diffusion(&models_dir, 2)?;

    let mut rng = StdRng::seed_from_u64(17);
    let specs = vec!["2".to_string()];
    let plan = plan_batch("t", Some("b"), &specs, 3, None, &outputs_dir, &mut rng);
    let expected: Vec<String> = plan.jobs.iter().map(|j| j.folder_name.clone()).collect();

    let ctx = Arc::new(context(&models_dir, "sh fake_diffusion.sh"));
    let report = run_batch(plan, ctx, 2).await?;

    let collected: Vec<String> = report.runs.iter().map(|r| r.folder_name.clone()).collect();
    assert_eq!(collected, expected);
    assert_eq!(report.successes(), 3);

    let json = fs::read_to_string(outputs_dir.join("b").join("report.json"))?;
    let parsed: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(parsed["batch_name"], "b");
    assert_eq!(parsed["runs"].as_array().unwrap().len(), 3);
    assert_eq!(parsed["runs"][0]["result"], "success");

    Ok(())
}
