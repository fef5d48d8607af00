//! Artifact resolution for `cf push`

use crate::error::{CfError, Result};
use cfpaas_core::archive_name_from_url;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A pushable file on local disk; downloads live as long as this value
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    download: Option<TempDir>,
}

impl Artifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_download(&self) -> bool {
        self.download.is_some()
    }
}

/// Where an artifact comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    Remote(String),
    Local(PathBuf),
}

impl ArtifactSource {
    pub fn parse(artifact: &str) -> Self {
        if artifact.starts_with("http://") || artifact.starts_with("https://") {
            ArtifactSource::Remote(artifact.to_string())
        } else {
            let path = artifact.strip_prefix("file://").unwrap_or(artifact);
            ArtifactSource::Local(PathBuf::from(path))
        }
    }
}

/// Downloads remote artifacts and checks local ones
pub struct ArtifactFetcher {
    http: reqwest::Client,
}

impl ArtifactFetcher {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cfpaas/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    pub async fn fetch(&self, artifact: &str) -> Result<Artifact> {
        match ArtifactSource::parse(artifact) {
            ArtifactSource::Local(path) => {
                if !tokio::fs::try_exists(&path).await? {
                    return Err(CfError::ArtifactNotFound(path.display().to_string()));
                }
                Ok(Artifact {
                    path,
                    download: None,
                })
            }
            ArtifactSource::Remote(url) => self.download(&url).await,
        }
    }

    async fn download(&self, url: &str) -> Result<Artifact> {
        let dir = tempfile::Builder::new().prefix("cfpaas-artifact-").tempdir()?;
        let path = dir.path().join(download_file_name(url));

        tracing::info!("Downloading {}", url);
        let response = self.http.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CfError::ArtifactNotFound(url.to_string()));
        }
        let bytes = response.error_for_status()?.bytes().await?;
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());

        Ok(Artifact {
            path,
            download: Some(dir),
        })
    }
}

/// Local file name for a downloaded artifact
pub(crate) fn download_file_name(url: &str) -> String {
    let name = archive_name_from_url(url);
    let name = name.trim();
    if name.is_empty() || name.contains('/') || name.contains('?') {
        "artifact".to_string()
    } else {
        name.to_string()
    }
}
