// src/config/validate.rs

use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use regex::Regex;

use crate::config::model::{ConfigFile, UnpackKind};

static RM_AA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z](,[A-Za-z])*$").expect("rm_aa regex"));

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - `[runner].max_parallel >= 1` and a positive timeout
/// - non-empty command prefixes for both wrapped binaries
/// - `[design].rm_aa` is a comma-separated list of residue letters
/// - every `[[assets]]` entry has a name, a URL, and a file destination when
///   it is not an archive
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_runner(cfg)?;
    validate_commands(cfg)?;
    validate_design(cfg)?;
    validate_assets(cfg)?;
    Ok(())
}

fn validate_runner(cfg: &ConfigFile) -> Result<()> {
    if cfg.runner.max_parallel == 0 {
        return Err(anyhow!("[runner].max_parallel must be >= 1 (got 0)"));
    }
    if !(cfg.runner.timeout_hours > 0.0) {
        return Err(anyhow!(
            "[runner].timeout_hours must be positive (got {})",
            cfg.runner.timeout_hours
        ));
    }
    Ok(())
}

fn validate_commands(cfg: &ConfigFile) -> Result<()> {
    if cfg.diffusion.command.trim().is_empty() {
        return Err(anyhow!("[diffusion].command must not be empty"));
    }
    if cfg.design.command.trim().is_empty() {
        return Err(anyhow!("[design].command must not be empty"));
    }
    Ok(())
}

fn validate_design(cfg: &ConfigFile) -> Result<()> {
    if !RM_AA_RE.is_match(&cfg.design.rm_aa) {
        return Err(anyhow!(
            "[design].rm_aa must be comma-separated residue letters, got '{}'",
            cfg.design.rm_aa
        ));
    }
    if !(cfg.design.sampling_temp > 0.0) {
        return Err(anyhow!(
            "[design].sampling_temp must be positive (got {})",
            cfg.design.sampling_temp
        ));
    }
    Ok(())
}

fn validate_assets(cfg: &ConfigFile) -> Result<()> {
    for asset in &cfg.assets {
        if asset.name.trim().is_empty() {
            return Err(anyhow!("[[assets]] entry with empty name"));
        }
        if asset.url.trim().is_empty() {
            return Err(anyhow!("asset '{}' has an empty url", asset.name));
        }
        if asset.unpack == UnpackKind::None && asset.dest.as_os_str().is_empty() {
            return Err(anyhow!(
                "asset '{}' is a plain file and needs a `dest` path",
                asset.name
            ));
        }
        if asset.dest.is_absolute() {
            return Err(anyhow!(
                "asset '{}' dest must be relative to models_dir",
                asset.name
            ));
        }
    }
    Ok(())
}
