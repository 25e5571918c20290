// src/assets/manifest.rs

//! Built-in weight manifest.
//!
//! Mirrors a stock RFdiffusion + ColabDesign installation: AlphaFold
//! scoring parameters, the diffusion schedules archive, and the two
//! diffusion checkpoints. `[[assets]]` entries in the config replace this
//! list wholesale.

use std::path::PathBuf;

use crate::config::{AssetConfig, UnpackKind};

const ALPHAFOLD_PARAMS_URL: &str =
    "https://storage.googleapis.com/alphafold/alphafold_params_2022-12-06.tar";
const SCHEDULES_URL: &str = "https://files.ipd.uw.edu/krypton/schedules.zip";
const BASE_CKPT_URL: &str =
    "http://files.ipd.uw.edu/pub/RFdiffusion/6f5902ac237024bdd0c176cb93063dc4/Base_ckpt.pt";
const COMPLEX_CKPT_URL: &str =
    "http://files.ipd.uw.edu/pub/RFdiffusion/e29311f6f1bf1af907f9ef9f44b8328b/Complex_base_ckpt.pt";

/// A single downloadable weight file or archive.
pub type Asset = AssetConfig;

/// The default download set used when the config lists no assets.
pub fn default_manifest() -> Vec<Asset> {
    vec![
        Asset {
            name: "alphafold-params".to_string(),
            url: ALPHAFOLD_PARAMS_URL.to_string(),
            dest: PathBuf::from("params"),
            unpack: UnpackKind::Tar,
        },
        Asset {
            name: "schedules".to_string(),
            url: SCHEDULES_URL.to_string(),
            dest: PathBuf::new(),
            unpack: UnpackKind::Zip,
        },
        Asset {
            name: "base-ckpt".to_string(),
            url: BASE_CKPT_URL.to_string(),
            dest: PathBuf::from("RFdiffusion/models/Base_ckpt.pt"),
            unpack: UnpackKind::None,
        },
        Asset {
            name: "complex-base-ckpt".to_string(),
            url: COMPLEX_CKPT_URL.to_string(),
            dest: PathBuf::from("RFdiffusion/models/Complex_base_ckpt.pt"),
            unpack: UnpackKind::None,
        },
    ]
}
