//! Configuration for the conversion controller.
//!
//! Every controller knob lives in [`ConversionConfig`], built through
//! [`ConversionConfigBuilder`]. Renderer-specific settings (pdfium library
//! path, password, pixel cap) live on [`crate::PdfiumRenderer`] instead,
//! because they only make sense for that backend.

use crate::error::Pdf2ImgError;
use serde::{Deserialize, Serialize};

/// Default rasterisation scale: two device pixels per PDF point.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Configuration for a [`crate::ConversionController`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2img::{ArchiveCompression, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .scale(1.5)
///     .compression(ArchiveCompression::Stored)
///     .build()
///     .unwrap();
/// assert_eq!(config.scale, 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Scale factor passed to the renderer for every page. Range: 0.25–8.0.
    /// Default: 2.0.
    pub scale: f32,

    /// Suffix appended to the source base name for the archive download.
    /// Default: `-images.zip`.
    pub archive_suffix: String,

    /// Base name used for the archive when no source is held.
    /// Default: `pdf-pages`.
    pub fallback_base_name: String,

    /// Delay before a delivered blob handle is revoked. Default: 2000 ms.
    pub blob_release_delay_ms: u64,

    /// Compression applied to archive entries. Default: Deflated.
    pub compression: ArchiveCompression,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            archive_suffix: "-images.zip".to_string(),
            fallback_base_name: "pdf-pages".to_string(),
            blob_release_delay_ms: 2000,
            compression: ArchiveCompression::default(),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// File name of the archive for a given source base name.
    pub fn archive_name(&self, base_name: Option<&str>) -> String {
        let base = base_name
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.fallback_base_name);
        format!("{}{}", base, self.archive_suffix)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn archive_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.archive_suffix = suffix.into();
        self
    }

    pub fn fallback_base_name(mut self, name: impl Into<String>) -> Self {
        self.config.fallback_base_name = name.into();
        self
    }

    pub fn blob_release_delay_ms(mut self, ms: u64) -> Self {
        self.config.blob_release_delay_ms = ms;
        self
    }

    pub fn compression(mut self, compression: ArchiveCompression) -> Self {
        self.config.compression = compression;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ImgError> {
        let c = &self.config;
        if !c.scale.is_finite() || c.scale < 0.25 || c.scale > 8.0 {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "Scale must be 0.25–8.0, got {}",
                c.scale
            )));
        }
        if c.archive_suffix.is_empty() {
            return Err(Pdf2ImgError::InvalidConfig(
                "Archive suffix must not be empty".into(),
            ));
        }
        if c.fallback_base_name.is_empty() {
            return Err(Pdf2ImgError::InvalidConfig(
                "Fallback base name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Compression method for archive entries.
///
/// PNG data is already deflate-compressed, so `Stored` produces nearly the
/// same archive size in a fraction of the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArchiveCompression {
    /// Entries are stored verbatim.
    Stored,
    /// Entries are deflate-compressed. (default)
    #[default]
    Deflated,
}
