//! Persisted catalogue file.
//!
//! The whole catalogue is read on load and rewritten on save; see
//! [`record`](super::record) for the line format.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::info;

use super::catalogue::Catalogue;
use super::record::{self, FormatError, SkippedLine};
use crate::domain::Media;

/// Errors that can occur reading or writing the catalogue file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt catalogue {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// What a load produced
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub catalogue: Catalogue,

    /// Malformed lines that were ignored
    pub skipped: Vec<SkippedLine>,

    /// False when the file did not exist (fresh install)
    pub existed: bool,
}

impl LoadReport {
    /// Number of records decoded successfully
    pub fn decoded_count(&self) -> usize {
        self.catalogue.len()
    }
}

/// Handle on the flat-file catalogue store
#[derive(Debug, Clone)]
pub struct CatalogueFile {
    path: PathBuf,
}

impl CatalogueFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the store at the configured location
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::catalogue_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalogue. A missing file yields an empty catalogue.
    pub async fn load(&self) -> Result<LoadReport, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No catalogue file yet, starting empty");
                return Ok(LoadReport::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let decoded = record::decode_catalogue(&content).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;

        info!(
            path = %self.path.display(),
            decoded = decoded.decoded_count(),
            skipped = decoded.skipped.len(),
            "Loaded catalogue"
        );

        Ok(LoadReport {
            catalogue: decoded.media.into(),
            skipped: decoded.skipped,
            existed: true,
        })
    }

    /// Overwrite the file with one record per item, in order.
    ///
    /// The records are written to a sibling temp file which then replaces the
    /// catalogue, so a failed save leaves the previous file in place.
    pub async fn save<'a>(
        &self,
        items: impl IntoIterator<Item = &'a Media>,
    ) -> Result<usize, StoreError> {
        let (content, count) = record::encode_counted(items);

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| self.io_error(e))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(self.io_error(e));
        }

        info!(path = %self.path.display(), records = count, "Saved catalogue");
        Ok(count)
    }

    /// Whether the catalogue file exists yet
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
