//! The selected source file.
//!
//! A [`SourceFile`] is what the user picked or dropped: a name, a byte size,
//! a *declared* media type, and a payload that is only read when conversion
//! starts. The media type is declared rather than sniffed, mirroring how a
//! file picker reports it: `notes.pdf` that actually holds plain text still
//! passes selection and then fails at parse time.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// The only media type accepted by [`crate::ConversionController::select_source`].
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

static RE_PDF_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.pdf$").unwrap());

/// Where the payload bytes come from.
#[derive(Debug, Clone)]
enum Payload {
    /// Read from disk when conversion starts.
    Path(PathBuf),
    /// Already in memory (drag-and-drop, upload, tests).
    Memory(Arc<[u8]>),
}

/// A user-selected input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    size: u64,
    media_type: String,
    payload: Payload,
}

impl SourceFile {
    /// Describe a file on disk. The declared media type is derived from the
    /// file extension; the payload is not read yet.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Described source {} ({} bytes)", path.display(), meta.len());
        Ok(Self {
            media_type: media_type_for_path(path).to_string(),
            name,
            size: meta.len(),
            payload: Payload::Path(path.to_path_buf()),
        })
    }

    /// Wrap bytes already held in memory with an explicit declared type.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            media_type: media_type.into(),
            payload: Payload::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Whether the declared media type is exactly [`PDF_MEDIA_TYPE`].
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }

    /// The last path component of the name with a trailing `.pdf` (any
    /// case) removed.
    pub fn base_name(&self) -> String {
        let file = self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name);
        RE_PDF_EXTENSION.replace(file, "").into_owned()
    }

    /// `"<name> · <human size>"`, as shown next to the drop zone.
    pub fn display_info(&self) -> String {
        format!("{} · {}", self.name, human_file_size(self.size))
    }

    /// Read the full payload.
    pub async fn read_payload(&self) -> std::io::Result<Arc<[u8]>> {
        match &self.payload {
            Payload::Memory(bytes) => Ok(Arc::clone(bytes)),
            Payload::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(Arc::from(bytes))
            }
        }
    }
}

/// Declared media type for a path, based on its extension.
///
/// Unknown extensions map to the empty string, which is what browsers report
/// for files they cannot classify.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MEDIA_TYPE,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        "zip" => "application/zip",
        _ => "",
    }
}

/// Format a byte count as `"512 B"`, `"1.5 KB"`, `"2.0 MB"`, …
pub fn human_file_size(bytes: u64) -> String {
    const THRESH: f64 = 1024.0;
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if (bytes as f64) < THRESH {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    value /= THRESH;
    while value >= THRESH && unit < UNITS.len() - 1 {
        value /= THRESH;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
