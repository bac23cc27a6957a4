//! Where downloads end up.
//!
//! A [`DownloadTarget`] receives a finished blob and a suggested file name,
//! the way a browser receives a clicked download link. [`DirectoryTarget`]
//! writes into a directory on disk; [`MemoryTarget`] keeps everything for
//! inspection.

use crate::error::Pdf2ImgError;
use futures::future::{BoxFuture, FutureExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

/// What a target reports back after storing a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub file_name: String,
    /// Where the blob was written, for targets backed by a filesystem.
    pub path: Option<PathBuf>,
    pub size: usize,
}

/// Receives one blob per download.
pub trait DownloadTarget: Send + Sync {
    fn save(
        &self,
        file_name: &str,
        blob: Arc<[u8]>,
    ) -> BoxFuture<'_, Result<DownloadReceipt, Pdf2ImgError>>;
}

/// Writes each download into a directory.
///
/// Files are written to a temporary sibling first and then renamed, so a
/// reader never observes a half-written file.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn save_file(
        &self,
        file_name: String,
        blob: Arc<[u8]>,
    ) -> Result<DownloadReceipt, Pdf2ImgError> {
        // Only the final component is honoured, so a name can never address
        // anything outside `dir`.
        let file_name = Path::new(&file_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Pdf2ImgError::DownloadFailed {
                path: self.dir.join(&file_name),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("'{}' has no file name component", file_name),
                ),
            })?;

        let dir = self.dir.clone();
        let path = dir.join(&file_name);
        let target = path.clone();
        let size = blob.len();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&blob)?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("Download task panicked: {}", e)))?
        .map_err(|source| Pdf2ImgError::DownloadFailed {
            path: path.clone(),
            source,
        })?;

        info!("Saved {} ({} bytes)", path.display(), size);

        Ok(DownloadReceipt {
            file_name,
            path: Some(path),
            size,
        })
    }
}

impl DownloadTarget for DirectoryTarget {
    fn save(
        &self,
        file_name: &str,
        blob: Arc<[u8]>,
    ) -> BoxFuture<'_, Result<DownloadReceipt, Pdf2ImgError>> {
        self.save_file(file_name.to_string(), blob).boxed()
    }
}

/// Keeps every download in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Bytes of the most recent download named `file_name`.
    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|(n, _)| n == file_name)
            .map(|(_, b)| b.clone())
    }
}

impl DownloadTarget for MemoryTarget {
    fn save(
        &self,
        file_name: &str,
        blob: Arc<[u8]>,
    ) -> BoxFuture<'_, Result<DownloadReceipt, Pdf2ImgError>> {
        let receipt = DownloadReceipt {
            file_name: file_name.to_string(),
            path: None,
            size: blob.len(),
        };
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((file_name.to_string(), blob.to_vec()));
        futures::future::ready(Ok(receipt)).boxed()
    }
}
