// src/job/plan.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Local;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

/// Length of the random suffix in run folder names.
const RUN_ID_LEN: usize = 5;

/// One planned run: a single (contig spec, design index) combination.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Unique within the batch.
    pub folder_name: String,
    /// `{outputs_dir}/{batch_name}/{folder_name}`
    pub run_path: PathBuf,
    /// Raw contig spec for this run (not yet fixed up).
    pub contig_spec: String,
    pub design_index: u32,
    /// GPU device index exported as `CUDA_VISIBLE_DEVICES`, if any.
    pub gpu: Option<String>,
}

/// A named batch and its runs, in submission order.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub batch_name: String,
    pub batch_path: PathBuf,
    pub jobs: Vec<JobSpec>,
}

/// `batch_{YYYYmmdd_HHMMSS}` from the local clock.
pub fn default_batch_name() -> String {
    format!("batch_{}", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Split the `--contigs` argument into individual contig specs.
pub fn split_contig_specs(contigs: &str) -> Vec<String> {
    contigs
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Expand the (contig × design) grid into a batch plan.
///
/// Folder names embed the contig (with `/` flattened to `-`), the design
/// index, a timestamp, and a short random id; uniqueness within the batch
/// is enforced by regenerating the id on collision.
pub fn plan_batch(
    name: &str,
    batch_name: Option<&str>,
    contig_specs: &[String],
    num_designs: u32,
    gpus: Option<&[String]>,
    outputs_dir: &Path,
    rng: &mut impl Rng,
) -> BatchPlan {
    let batch_name = match batch_name {
        Some(n) => n.to_string(),
        None => default_batch_name(),
    };
    let batch_path = outputs_dir.join(&batch_name);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

    let mut seen = HashSet::new();
    let mut jobs = Vec::with_capacity(contig_specs.len() * num_designs as usize);

    for contig_spec in contig_specs {
        for design_index in 0..num_designs {
            let folder_name = loop {
                let candidate = folder_name(name, contig_spec, design_index, &timestamp, &run_id(rng));
                if seen.insert(candidate.clone()) {
                    break candidate;
                }
                debug!(folder = %candidate, "folder name collision, regenerating id");
            };

            let gpu = gpus.and_then(|g| {
                if g.is_empty() {
                    None
                } else {
                    Some(g[jobs.len() % g.len()].clone())
                }
            });

            jobs.push(JobSpec {
                run_path: batch_path.join(&folder_name),
                folder_name,
                contig_spec: contig_spec.clone(),
                design_index,
                gpu,
            });
        }
    }

    BatchPlan {
        batch_name,
        batch_path,
        jobs,
    }
}

fn folder_name(
    name: &str,
    contig_spec: &str,
    design_index: u32,
    timestamp: &str,
    run_id: &str,
) -> String {
    let contig = contig_spec.replace('/', "-");
    format!("{name}_contig{contig}_design{design_index}_{timestamp}_{run_id}")
}

/// 5 random lowercase alphanumeric characters.
fn run_id(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(RUN_ID_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contig_spec_list_splits_on_commas() {
        let specs = split_contig_specs(" 100 , A1-10/20 ,, ");
        assert_eq!(specs, vec!["100".to_string(), "A1-10/20".to_string()]);
    }

    #[test]
    fn folder_names_flatten_slashes() {
        let name = folder_name("test", "A1-10/20", 2, "20250101_120000", "ab1cd");
        assert_eq!(name, "test_contigA1-10-20_design2_20250101_120000_ab1cd");
    }
}
