// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// models_dir = "/data/models"
/// outputs_dir = "/data/outputs"
///
/// [diffusion]
/// command = "python RFdiffusion/run_inference.py"
///
/// [design]
/// num_seqs = 8
/// rm_aa = "C"
///
/// [runner]
/// max_parallel = 2
/// timeout_hours = 4.0
///
/// [[assets]]
/// name = "base-ckpt"
/// url = "http://example.org/Base_ckpt.pt"
/// dest = "RFdiffusion/models/Base_ckpt.pt"
/// ```
///
/// All sections are optional and have defaults mirroring the stock
/// RFdiffusion + ColabDesign installation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Filesystem layout from `[paths]`.
    #[serde(default)]
    pub paths: PathsSection,

    /// Weight downloads from `[[assets]]`.
    ///
    /// When empty, the built-in manifest is used (see `assets::manifest`).
    #[serde(default)]
    pub assets: Vec<AssetConfig>,

    /// Diffusion binary invocation from `[diffusion]`.
    #[serde(default)]
    pub diffusion: DiffusionSection,

    /// Sequence-design binary invocation and defaults from `[design]`.
    #[serde(default)]
    pub design: DesignSection,

    /// Execution limits from `[runner]`.
    #[serde(default)]
    pub runner: RunnerSection,
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Directory holding weight files; also the working directory for the
    /// diffusion binary.
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Directory receiving per-batch, per-run output folders.
    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: PathBuf,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("/data/models")
}

fn default_outputs_dir() -> PathBuf {
    PathBuf::from("/data/outputs")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            outputs_dir: default_outputs_dir(),
        }
    }
}

/// One `[[assets]]` entry: a downloadable weight file or archive.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    pub name: String,
    pub url: String,

    /// Destination relative to `models_dir`: a file path for plain assets,
    /// a directory for archives. Empty means the models dir itself.
    #[serde(default)]
    pub dest: PathBuf,

    /// How to treat the downloaded bytes.
    #[serde(default)]
    pub unpack: UnpackKind,
}

/// Archive handling for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnpackKind {
    /// Keep the downloaded file as-is.
    #[default]
    None,
    /// Unpack an uncompressed tar archive into `dest`.
    Tar,
    /// Unpack a zip archive into `dest`.
    Zip,
}

/// `[diffusion]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DiffusionSection {
    /// Command prefix the Hydra-style options are appended to. Run through
    /// the shell with `models_dir` as the working directory.
    #[serde(default = "default_diffusion_command")]
    pub command: String,
}

fn default_diffusion_command() -> String {
    "python RFdiffusion/run_inference.py".to_string()
}

impl Default for DiffusionSection {
    fn default() -> Self {
        Self {
            command: default_diffusion_command(),
        }
    }
}

/// `[design]` section: sequence-design invocation and its defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignSection {
    /// Command prefix the `--flag=value` options are appended to.
    #[serde(default = "default_design_command")]
    pub command: String,

    /// Sequences sampled per design.
    #[serde(default = "default_num_seqs")]
    pub num_seqs: u32,

    /// Structure-prediction recycles during scoring.
    #[serde(default = "default_num_recycles")]
    pub num_recycles: u32,

    /// Residue types excluded from sampling (comma-separated letters).
    #[serde(default = "default_rm_aa")]
    pub rm_aa: String,

    /// Sampling temperature for the sequence model.
    #[serde(default = "default_sampling_temp")]
    pub sampling_temp: f64,

    /// Designs scored per run.
    #[serde(default = "default_design_num_designs")]
    pub num_designs: u32,

    /// Pass `--initial_guess` to the design binary.
    #[serde(default)]
    pub initial_guess: bool,

    /// Pass `--use_multimer` to the design binary.
    #[serde(default)]
    pub use_multimer: bool,
}

fn default_design_command() -> String {
    "python -m colabdesign.rf.designability_test".to_string()
}

fn default_num_seqs() -> u32 {
    8
}

fn default_num_recycles() -> u32 {
    1
}

fn default_rm_aa() -> String {
    "C".to_string()
}

fn default_sampling_temp() -> f64 {
    0.1
}

fn default_design_num_designs() -> u32 {
    1
}

impl Default for DesignSection {
    fn default() -> Self {
        Self {
            command: default_design_command(),
            num_seqs: default_num_seqs(),
            num_recycles: default_num_recycles(),
            rm_aa: default_rm_aa(),
            sampling_temp: default_sampling_temp(),
            num_designs: default_design_num_designs(),
            initial_guess: false,
            use_multimer: false,
        }
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Runs executing at once. Diffusion saturates a GPU, so this should
    /// usually match the number of devices passed via `--gpus`.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Per-run wall-clock limit in hours.
    #[serde(default = "default_timeout_hours")]
    pub timeout_hours: f64,
}

fn default_max_parallel() -> usize {
    1
}

fn default_timeout_hours() -> f64 {
    4.0
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            timeout_hours: default_timeout_hours(),
        }
    }
}
