//! Archive packing: the builder seam and its ZIP implementation.
//!
//! Entries are collected in memory and the archive is written in one go on a
//! blocking thread, so `add_entry` never does I/O. Adding an entry under a
//! name that already exists replaces the earlier bytes in place.

use crate::config::ArchiveCompression;
use crate::error::ArchiveError;
use futures::future::{BoxFuture, FutureExt};
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Accepts named binary entries and produces one archive blob.
pub trait ArchiveBuilder: Send {
    /// Add (or replace) the entry `name`.
    fn add_entry(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), ArchiveError>;

    /// Number of entries added so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the archive.
    fn build(self: Box<Self>) -> BoxFuture<'static, Result<Vec<u8>, ArchiveError>>;
}

/// Creates fresh [`ArchiveBuilder`]s; one builder per download.
pub trait ArchiveFormat: Send + Sync {
    fn builder(&self) -> Box<dyn ArchiveBuilder>;
}

/// ZIP archives via the `zip` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveFormat {
    compression: ArchiveCompression,
}

impl ZipArchiveFormat {
    pub fn new(compression: ArchiveCompression) -> Self {
        Self { compression }
    }
}

impl ArchiveFormat for ZipArchiveFormat {
    fn builder(&self) -> Box<dyn ArchiveBuilder> {
        Box::new(ZipArchiveBuilder {
            compression: self.compression,
            entries: Vec::new(),
        })
    }
}

/// Collects entries for one ZIP archive.
#[derive(Debug)]
pub struct ZipArchiveBuilder {
    compression: ArchiveCompression,
    entries: Vec<(String, Vec<u8>)>,
}

impl ZipArchiveBuilder {
    fn write_blocking(
        compression: ArchiveCompression,
        entries: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<u8>, ArchiveError> {
        let method = match compression {
            ArchiveCompression::Stored => CompressionMethod::Stored,
            ArchiveCompression::Deflated => CompressionMethod::Deflated,
        };
        let options = SimpleFileOptions::default().compression_method(method);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in &entries {
            let write_err = |detail: String| ArchiveError::Write {
                entry: name.clone(),
                detail,
            };
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| write_err(e.to_string()))?;
            writer
                .write_all(bytes)
                .map_err(|e| write_err(e.to_string()))?;
        }

        let blob = writer
            .finish()
            .map_err(|e| ArchiveError::Write {
                entry: "<central directory>".to_string(),
                detail: e.to_string(),
            })?
            .into_inner();

        debug!("Packed {} entries → {} bytes ZIP", entries.len(), blob.len());
        Ok(blob)
    }
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn add_entry(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), ArchiveError> {
        if name.is_empty() {
            return Err(ArchiveError::Write {
                entry: String::new(),
                detail: "entry name must not be empty".to_string(),
            });
        }
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = bytes,
            None => self.entries.push((name.to_string(), bytes)),
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn build(self: Box<Self>) -> BoxFuture<'static, Result<Vec<u8>, ArchiveError>> {
        let ZipArchiveBuilder {
            compression,
            entries,
        } = *self;
        async move {
            tokio::task::spawn_blocking(move || Self::write_blocking(compression, entries))
                .await
                .map_err(|e| ArchiveError::Internal(format!("Archive task panicked: {}", e)))
                .and_then(|result| result)
        }
        .boxed()
    }
}
