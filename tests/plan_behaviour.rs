use std::collections::HashSet;
use std::error::Error;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use rfpilot::job::{default_batch_name, plan_batch};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn plan_expands_the_contig_by_design_grid() -> TestResult {
    let mut rng = StdRng::seed_from_u64(3);
    let specs = vec!["100".to_string(), "A1-10/20".to_string()];
    let plan = plan_batch(
        "test",
        Some("mybatch"),
        &specs,
        3,
        None,
        Path::new("/data/outputs"),
        &mut rng,
    );

    assert_eq!(plan.batch_name, "mybatch");
    assert_eq!(plan.batch_path, Path::new("/data/outputs/mybatch"));
    assert_eq!(plan.jobs.len(), 6);

    // Jobs are ordered contig-major, design-minor.
    assert_eq!(plan.jobs[0].contig_spec, "100");
    assert_eq!(plan.jobs[0].design_index, 0);
    assert_eq!(plan.jobs[2].design_index, 2);
    assert_eq!(plan.jobs[3].contig_spec, "A1-10/20");

    for job in &plan.jobs {
        assert_eq!(job.run_path, plan.batch_path.join(&job.folder_name));
    }

    Ok(())
}

#[test]
fn folder_names_are_unique_within_a_batch() -> TestResult {
    let mut rng = StdRng::seed_from_u64(5);
    let specs = vec!["100".to_string()];
    let plan = plan_batch(
        "test",
        Some("b"),
        &specs,
        50,
        None,
        Path::new("/out"),
        &mut rng,
    );

    let names: HashSet<&str> = plan.jobs.iter().map(|j| j.folder_name.as_str()).collect();
    assert_eq!(names.len(), plan.jobs.len());

    Ok(())
}

#[test]
fn folder_names_embed_the_flattened_contig_and_design_index() -> TestResult {
    let mut rng = StdRng::seed_from_u64(11);
    let specs = vec!["A1-10/20".to_string()];
    let plan = plan_batch(
        "scaffold",
        Some("b"),
        &specs,
        2,
        None,
        Path::new("/out"),
        &mut rng,
    );

    assert!(plan.jobs[0].folder_name.starts_with("scaffold_contigA1-10-20_design0_"));
    assert!(plan.jobs[1].folder_name.starts_with("scaffold_contigA1-10-20_design1_"));

    Ok(())
}

#[test]
fn gpus_are_assigned_round_robin() -> TestResult {
    let mut rng = StdRng::seed_from_u64(13);
    let specs = vec!["100".to_string()];
    let gpus = vec!["0".to_string(), "1".to_string()];
    let plan = plan_batch(
        "t",
        Some("b"),
        &specs,
        4,
        Some(&gpus),
        Path::new("/out"),
        &mut rng,
    );

    let assigned: Vec<&str> = plan
        .jobs
        .iter()
        .map(|j| j.gpu.as_deref().unwrap())
        .collect();
    assert_eq!(assigned, vec!["0", "1", "0", "1"]);

    Ok(())
}

#[test]
fn default_batch_names_are_timestamped() -> TestResult {
    let name = default_batch_name();
    assert!(name.starts_with("batch_"));
    // batch_YYYYmmdd_HHMMSS
    assert_eq!(name.len(), "batch_".len() + 15);
    Ok(())
}
