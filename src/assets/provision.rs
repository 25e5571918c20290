// src/assets/provision.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::assets::manifest::{default_manifest, Asset};
use crate::config::{ConfigFile, UnpackKind};

/// Log download progress every this many bytes.
const PROGRESS_STEP: u64 = 256 * 1024 * 1024;

/// Downloads the weight manifest into the models directory.
///
/// Idempotent: once `params/done.txt` exists the whole run is skipped, and
/// individual plain-file assets that already exist are skipped even without
/// the marker (a previous run may have been interrupted).
#[derive(Debug)]
pub struct Provisioner {
    models_dir: PathBuf,
    assets: Vec<Asset>,
}

impl Provisioner {
    pub fn new(cfg: &ConfigFile) -> Self {
        let assets = if cfg.assets.is_empty() {
            default_manifest()
        } else {
            cfg.assets.clone()
        };
        Self {
            models_dir: cfg.paths.models_dir.clone(),
            assets,
        }
    }

    /// Marker file whose presence signals a completed download set.
    pub fn marker_path(&self) -> PathBuf {
        self.models_dir.join("params").join("done.txt")
    }

    pub fn is_provisioned(&self) -> bool {
        self.marker_path().is_file()
    }

    /// Download and unpack every asset, then write the completion marker.
    pub async fn provision(&self, force: bool) -> Result<()> {
        if self.is_provisioned() && !force {
            info!(marker = ?self.marker_path(), "weights already provisioned, nothing to do");
            return Ok(());
        }

        fs::create_dir_all(&self.models_dir)
            .with_context(|| format!("creating models dir {:?}", self.models_dir))?;

        let client = reqwest::Client::new();
        for asset in &self.assets {
            self.fetch_asset(&client, asset, force).await?;
        }

        self.write_marker()?;
        info!(models_dir = ?self.models_dir, "weights provisioned");
        Ok(())
    }

    async fn fetch_asset(&self, client: &reqwest::Client, asset: &Asset, force: bool) -> Result<()> {
        let dest = self.models_dir.join(&asset.dest);

        if asset.unpack == UnpackKind::None && dest.is_file() && !force {
            info!(asset = %asset.name, ?dest, "already present, skipping");
            return Ok(());
        }

        let staging = self.models_dir.join(format!(".{}.part", asset.name));
        download_to_file(client, &asset.url, &staging)
            .await
            .with_context(|| format!("downloading asset '{}'", asset.name))?;

        match asset.unpack {
            UnpackKind::None => {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating {:?}", parent))?;
                }
                fs::rename(&staging, &dest)
                    .with_context(|| format!("placing asset '{}' at {:?}", asset.name, dest))?;
                info!(asset = %asset.name, ?dest, "downloaded");
            }
            UnpackKind::Tar => {
                unpack_tar(&staging, &dest).await
                    .with_context(|| format!("unpacking tar asset '{}'", asset.name))?;
                fs::remove_file(&staging).ok();
                info!(asset = %asset.name, ?dest, "downloaded and unpacked (tar)");
            }
            UnpackKind::Zip => {
                unpack_zip(&staging, &dest).await
                    .with_context(|| format!("unpacking zip asset '{}'", asset.name))?;
                fs::remove_file(&staging).ok();
                info!(asset = %asset.name, ?dest, "downloaded and unpacked (zip)");
            }
        }
        Ok(())
    }

    fn write_marker(&self) -> Result<()> {
        let marker = self.marker_path();
        if let Some(parent) = marker.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {:?}", parent))?;
        }
        let contents = format!("weights initialized at {}\n", Utc::now().to_rfc3339());
        fs::write(&marker, contents)
            .with_context(|| format!("writing marker file {:?}", marker))?;
        Ok(())
    }
}

/// Stream a URL to a file on disk, logging coarse progress.
async fn download_to_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    info!(url, ?dest, "downloading");
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("server error for {url}"))?;

    let total = response.content_length();
    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("creating {:?}", dest))?;

    let mut downloaded: u64 = 0;
    let mut next_report = PROGRESS_STEP;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("reading response body of {url}"))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("writing to {:?}", dest))?;
        downloaded += chunk.len() as u64;
        if downloaded >= next_report {
            info!(
                downloaded_mb = downloaded / (1024 * 1024),
                total_mb = total.map(|t| t / (1024 * 1024)),
                "download progress"
            );
            next_report += PROGRESS_STEP;
        }
    }
    file.flush().await?;

    debug!(url, bytes = downloaded, "download finished");
    Ok(())
}

/// Unpack an uncompressed tar archive into a directory.
async fn unpack_tar(archive: &Path, dest_dir: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        fs::create_dir_all(&dest_dir)?;
        let file = fs::File::open(&archive)?;
        tar::Archive::new(file).unpack(&dest_dir)?;
        Ok(())
    })
    .await
    .context("tar unpack task panicked")?
}

/// Unpack a zip archive into a directory.
async fn unpack_zip(archive: &Path, dest_dir: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        fs::create_dir_all(&dest_dir)?;
        let file = fs::File::open(&archive)?;
        let mut zip = zip::ZipArchive::new(file)?;
        zip.extract(&dest_dir)?;
        Ok(())
    })
    .await
    .context("zip unpack task panicked")?
}
