//! Temporary handles for delivered blobs.
//!
//! When an archive is handed to a download target, the blob is registered
//! here and gets a `blob:` handle. The handle is revoked after a delay, at
//! which point the bytes are dropped. Data-URL page records never go through
//! the registry; they own their bytes.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Opaque handle for a registered blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared table of live blobs. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    blobs: Arc<Mutex<HashMap<BlobUrl, Arc<[u8]>>>>,
    next_id: Arc<AtomicU64>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and return a fresh handle.
    pub fn register(&self, bytes: Arc<[u8]>) -> BlobUrl {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let url = BlobUrl(format!("blob:pdf2img/{}", id));
        debug!("Registered {} ({} bytes)", url, bytes.len());
        self.table().insert(url.clone(), bytes);
        url
    }

    /// Bytes behind a live handle.
    pub fn resolve(&self, url: &BlobUrl) -> Option<Arc<[u8]>> {
        self.table().get(url).cloned()
    }

    /// Drop the blob. Returns `false` if the handle was already revoked.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        let removed = self.table().remove(url).is_some();
        if removed {
            debug!("Revoked {}", url);
        }
        removed
    }

    /// Revoke `url` after `delay` on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn revoke_after(&self, url: BlobUrl, delay: Duration) -> tokio::task::JoinHandle<bool> {
        let registry = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            registry.revoke(&url)
        })
    }

    /// Number of blobs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<BlobUrl, Arc<[u8]>>> {
        // Every critical section is a single map operation, so a poisoned
        // lock still guards a consistent map.
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}
