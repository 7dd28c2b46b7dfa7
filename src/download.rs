//! Placement of downloaded artifacts into the target directory.

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::http::FetchSession;
use crate::manifest::Manifest;
use crate::runtime::Runtime;

/// Streams `url` into `dest` and returns the number of bytes written.
///
/// Only a 200 is written out; any other outcome is an error here, after the
/// fetch session has already exhausted its retries and reported the details.
#[tracing::instrument(skip(runtime, client))]
pub async fn download_to<R: Runtime>(
    runtime: &R,
    client: &Client,
    url: &str,
    dest: &Path,
) -> Result<u64> {
    let mut response = FetchSession::run(client, url, true)
        .await
        .ok_or_else(|| anyhow!("download of {url} failed"))?;
    if response.status() != StatusCode::OK {
        bail!(
            "download of {url} returned HTTP {}",
            response.status().as_u16()
        );
    }

    let mut writer = runtime
        .create_file(dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;
    let mut written: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .context("failed to read download stream")?
    {
        writer
            .write_all(&chunk)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        written += chunk.len() as u64;
    }

    debug!(
        "downloaded {:.2} MB to {}",
        written as f64 / (1024.0 * 1024.0),
        dest.display()
    );
    Ok(written)
}

/// Joins a manifest-supplied path onto the target dir, rejecting anything
/// that would land outside it.
fn join_within(target_dir: &Path, sub: &str) -> Result<PathBuf> {
    let rel = Path::new(sub);
    if rel.is_absolute()
        || rel
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        bail!("manifest path {sub:?} escapes the target directory");
    }
    Ok(target_dir.join(rel))
}

/// Downloads every file of the manifest into `target_dir`, one at a time,
/// each under its own sub-directory, then the installer next to them when
/// requested. The first failed file aborts the run.
#[tracing::instrument(skip(runtime, client, manifest), fields(pack = %manifest.name))]
pub async fn download_pack<R: Runtime>(
    runtime: &R,
    client: &Client,
    manifest: &Manifest,
    target_dir: &Path,
    include_installer: bool,
) -> Result<()> {
    for file in &manifest.files {
        let dir = if file.path.is_empty() {
            target_dir.to_path_buf()
        } else {
            join_within(target_dir, &file.path)?
        };
        runtime
            .create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let dest = join_within(&dir, &file.name)?;
        info!("downloading {} to {}", file.url, dest.display());
        download_to(runtime, client, &file.url, &dest).await?;
    }

    if include_installer {
        let installer = manifest
            .installer
            .as_ref()
            .ok_or_else(|| anyhow!("pack {} does not provide an installer", manifest.name))?;
        let dest = join_within(target_dir, &installer.name)?;
        info!("downloading installer {} to {}", installer.url, dest.display());
        download_to(runtime, client, &installer.url, &dest).await?;
    }

    Ok(())
}
