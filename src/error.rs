//! Error types for the edgequake-pdf2img library.
//!
//! Three error types map onto the three places a run can go wrong:
//!
//! * [`Pdf2ImgError`] — returned by every [`crate::ConversionController`]
//!   operation. The controller has already pushed a human-readable status to
//!   its view by the time one of these is returned; the value exists so that
//!   library callers can branch on the outcome.
//!
//! * [`RendererError`] — produced by a [`crate::DocumentRenderer`] while
//!   loading, parsing or rasterising a document. Any of these aborts the
//!   whole conversion and discards partial output.
//!
//! * [`ArchiveError`] — produced by an [`crate::ArchiveBuilder`] while packing
//!   rendered pages.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the conversion controller.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// The selected file does not declare the PDF media type.
    #[error("'{name}' is not a PDF (declared type: {media_type:?})")]
    InvalidFileType { name: String, media_type: String },

    /// `convert` was triggered while no source was held.
    #[error("No PDF selected yet")]
    NoSourceSelected,

    /// The source payload could not be read.
    #[error("Could not read '{name}': {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// Parsing or rendering failed; all partial output was discarded.
    #[error("Conversion failed: {0}")]
    ConversionFailed(#[from] RendererError),

    /// The run was aborted through a [`crate::CancelHandle`].
    #[error("Conversion cancelled")]
    Cancelled,

    // ── Download errors ───────────────────────────────────────────────────
    /// The archive builder could not produce a blob.
    #[error("Archive packing failed: {0}")]
    ArchiveFailed(#[from] ArchiveError),

    /// The download target could not store the blob.
    #[error("Failed to save '{path}': {source}")]
    DownloadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A per-page download asked for a page that was not rendered.
    #[error("Page {page} is out of range ({total} pages rendered)")]
    PageOutOfRange { page: usize, total: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures raised by a document renderer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RendererError {
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or place the library next to the binary."
    )]
    Binding(String),

    /// The payload is not a loadable PDF.
    #[error("PDF could not be parsed: {detail}")]
    Parse { detail: String },

    /// The PDF is encrypted and no (or a wrong) password was supplied.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// Rasterising a single page failed.
    #[error("Rendering failed for page {page}: {detail}")]
    Render { page: usize, detail: String },

    /// The rasterised page could not be encoded as PNG.
    #[error("Encoding failed for page {page}: {detail}")]
    Encode { page: usize, detail: String },

    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Renderer internal error: {0}")]
    Internal(String),
}

/// Failures raised by an archive builder.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive writer rejected an entry or failed to finish.
    #[error("Failed to write archive entry '{entry}': {detail}")]
    Write { entry: String, detail: String },

    /// Unexpected internal error.
    #[error("Archive internal error: {0}")]
    Internal(String),
}
