//! # edgequake-pdf2img
//!
//! Convert every page of a PDF into a PNG image, preview the pages, and
//! download them one by one or bundled into a single ZIP.
//!
//! The heavy lifting is delegated: pdfium rasterises pages, `image` writes
//! PNG, `zip` packs the archive. This crate is the controller around them:
//! an explicit state machine, a strictly sequential render loop, and a
//! [`ConverterView`] seam that any front end (terminal, GUI, test harness)
//! can implement.
//!
//! ## Flow
//!
//! ```text
//! select_source ──▶ convert ──────────────────────────────▶ download_all
//!  (PDF check)       read → parse → page 1 … page N          (ZIP, <base>-images.zip)
//!                    each page: rasterise → PNG → card       download_page
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2img::{
//!     ConversionConfig, ConversionController, DirectoryTarget, HeadlessView, PdfiumRenderer,
//!     SourceFile,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let renderer = Arc::new(PdfiumRenderer::new());
//!     let mut controller =
//!         ConversionController::new(ConversionConfig::default(), renderer, HeadlessView::default());
//!
//!     controller.select_source(Some(SourceFile::from_path("report.pdf").await?))?;
//!     let summary = controller.convert().await?;
//!     eprintln!("{} pages", summary.page_count);
//!
//!     let target = DirectoryTarget::new("out");
//!     controller.download_all(&target).await?; // out/report-images.zip
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2img = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod blob;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod source;
pub mod state;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use blob::{BlobRegistry, BlobUrl};
pub use config::{ArchiveCompression, ConversionConfig, ConversionConfigBuilder, DEFAULT_SCALE};
pub use controller::{CancelHandle, ConversionController};
pub use download::{DirectoryTarget, DownloadReceipt, DownloadTarget, MemoryTarget};
pub use error::{ArchiveError, Pdf2ImgError, RendererError};
pub use output::{
    ConversionStats, ConversionSummary, DataUrl, DocumentMetadata, PageSummary, RenderedPage,
};
pub use pipeline::archive::{ArchiveBuilder, ArchiveFormat, ZipArchiveFormat};
pub use pipeline::render::{DocumentRenderer, LoadedDocument, PdfiumRenderer};
pub use preview::{PreviewArea, PreviewCard, EMPTY_PREVIEW_MESSAGE};
pub use source::{SourceFile, PDF_MEDIA_TYPE};
pub use state::{ConversionState, FailureKind, StatusLine};
pub use view::{ConverterView, HeadlessView, NoopView};
