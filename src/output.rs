//! Records produced by a conversion run.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A self-contained `data:<mime>;base64,<payload>` image blob.
///
/// This is what the preview thumbnail and the per-page download link point
/// at, so a rendered page never depends on any external handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataUrl(String);

impl DataUrl {
    /// Wrap PNG bytes.
    pub fn from_png(png: &[u8]) -> Self {
        Self(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The declared media type, e.g. `image/png`.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split(',').next()?;
        header.split(';').next().filter(|m| !m.is_empty())
    }

    /// Decode the payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = self.0.split_once(',').map(|(_, p)| p).unwrap_or("");
        STANDARD.decode(payload)
    }

    /// Length of the encoded string in bytes.
    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One successfully rasterised page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-based page index.
    pub page: usize,
    /// Rendered width in pixels.
    pub width: u32,
    /// Rendered height in pixels.
    pub height: u32,
    /// The encoded PNG.
    pub image: DataUrl,
}

impl RenderedPage {
    /// Download / archive entry name: `page-<index>.png`.
    pub fn file_name(&self) -> String {
        page_file_name(self.page)
    }

    /// Raw PNG bytes.
    pub fn png_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        self.image.decode()
    }
}

/// `page-<index>.png`.
pub fn page_file_name(page: usize) -> String {
    format!("page-{}.png", page)
}

/// Summary of a completed conversion, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Source file name.
    pub source: String,
    /// Number of pages the renderer reported.
    pub page_count: usize,
    /// Per-page details, in page order.
    pub pages: Vec<PageSummary>,
    pub stats: ConversionStats,
}

/// Per-page details inside a [`ConversionSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub page: usize,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    /// Size of the encoded data URL.
    pub encoded_bytes: usize,
}

impl From<&RenderedPage> for PageSummary {
    fn from(p: &RenderedPage) -> Self {
        Self {
            page: p.page,
            width: p.width,
            height: p.height,
            file_name: p.file_name(),
            encoded_bytes: p.image.encoded_len(),
        }
    }
}

/// Timing for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Time spent reading the payload.
    pub read_duration_ms: u64,
    /// Time spent parsing and rendering.
    pub render_duration_ms: u64,
    /// Wall-clock time of the whole run.
    pub total_duration_ms: u64,
    /// Scale factor used.
    pub scale: f32,
}

/// PDF metadata extracted without rendering any page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
