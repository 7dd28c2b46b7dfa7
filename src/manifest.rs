//! Pack manifest retrieval and decoding.

use anyhow::{Context, Result, anyhow};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::http::FetchSession;

/// One downloadable file belonging to a pack.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestFile {
    pub name: String,
    pub url: String,
    /// Sub-directory under the target dir, e.g. "mods". Empty means the
    /// target dir itself.
    #[serde(default)]
    pub path: String,
}

/// Standalone installer shipped next to the pack files.
#[derive(Debug, Clone, Deserialize)]
pub struct Installer {
    pub name: String,
    pub url: String,
}

/// A pack manifest as served by the catalog API.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub files: Vec<ManifestFile>,
    #[serde(default)]
    pub installer: Option<Installer>,
}

impl Manifest {
    pub fn mod_count(&self) -> usize {
        self.files.len()
    }
}

/// Fetches and decodes the manifest for a pack id.
///
/// The fetch itself absorbs transient server errors; this only fails once
/// the session has given up or the payload does not decode.
#[tracing::instrument(skip(client))]
pub async fn fetch(client: &Client, api_url: &str, pack_id: u32) -> Result<Manifest> {
    let url = format!(
        "{}/public/modpack/{}",
        api_url.trim_end_matches('/'),
        pack_id
    );
    debug!("fetching manifest from {url}");

    let response = FetchSession::run(client, &url, false)
        .await
        .ok_or_else(|| anyhow!("no response received from {url}"))?;
    if response.status() != StatusCode::OK {
        return Err(anyhow!(
            "manifest request for pack {pack_id} returned HTTP {}",
            response.status().as_u16()
        ));
    }

    response
        .json::<Manifest>()
        .await
        .context("failed to decode manifest JSON")
}
