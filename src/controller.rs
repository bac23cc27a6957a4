//! The conversion controller.
//!
//! [`ConversionController`] owns every piece of mutable state: the selected
//! source, the rendered-page records, the lifecycle state, and the view it
//! drives. All operations take `&mut self`, so two of them can never
//! interleave; within a run, reading, loading and each page render are
//! awaited one after another.
//!
//! ## Reset points
//!
//! | Event | Records | Preview | Download-all |
//! |-------|---------|---------|--------------|
//! | valid selection / clear | discarded | placeholder | disabled |
//! | conversion start | discarded | empty | disabled |
//! | render failure / cancel | discarded | placeholder | disabled |
//! | invalid selection | untouched | untouched | untouched |

use crate::blob::BlobRegistry;
use crate::config::ConversionConfig;
use crate::download::{DownloadReceipt, DownloadTarget};
use crate::error::{ArchiveError, Pdf2ImgError};
use crate::output::{ConversionStats, ConversionSummary, PageSummary, RenderedPage};
use crate::pipeline::archive::{ArchiveFormat, ZipArchiveFormat};
use crate::pipeline::encode::encode_page;
use crate::pipeline::render::DocumentRenderer;
use crate::preview::PreviewCard;
use crate::source::SourceFile;
use crate::state::{pages_label, ConversionState, FailureKind, StatusLine};
use crate::view::{ConverterView, CHOOSE_LABEL, CONVERTING_LABEL, CONVERT_LABEL, REPLACE_LABEL};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const NO_SOURCE_MESSAGE: &str = "No PDF selected yet.";
pub const PACKING_MESSAGE: &str = "Packing all pages into a ZIP…";
pub const ARCHIVE_DONE_MESSAGE: &str = "ZIP downloaded. Enjoy ✨";
pub const ARCHIVE_FAILED_MESSAGE: &str = "Could not build the ZIP. Please try again.";

/// Aborts an in-flight conversion from another task.
///
/// The controller checks the handle after every suspension point. A cancelled
/// run discards its partial output and returns [`Pdf2ImgError::Cancelled`].
///
/// ```rust
/// use edgequake_pdf2img::CancelHandle;
///
/// let handle = CancelHandle::default();
/// let token = handle.token();
/// assert!(!handle.is_cancelled(token));
/// handle.cancel();
/// assert!(handle.is_cancelled(token));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    generation: Arc<AtomicU64>,
}

impl CancelHandle {
    /// Cancel whatever run is in flight.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Snapshot taken when a run starts.
    pub fn token(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `cancel` was called since `token` was taken.
    pub fn is_cancelled(&self, token: u64) -> bool {
        self.token() != token
    }
}

/// Drives one [`ConverterView`] through selection, conversion and downloads.
pub struct ConversionController<V: ConverterView> {
    config: ConversionConfig,
    renderer: Arc<dyn DocumentRenderer>,
    archive: Arc<dyn ArchiveFormat>,
    view: V,
    source: Option<SourceFile>,
    pages: Vec<RenderedPage>,
    state: ConversionState,
    blobs: BlobRegistry,
    cancel: CancelHandle,
}

impl<V: ConverterView> ConversionController<V> {
    /// Create a controller in the `Idle` state and push the initial UI to
    /// `view`.
    pub fn new(config: ConversionConfig, renderer: Arc<dyn DocumentRenderer>, view: V) -> Self {
        let archive = Arc::new(ZipArchiveFormat::new(config.compression));
        let mut controller = Self {
            config,
            renderer,
            archive,
            view,
            source: None,
            pages: Vec::new(),
            state: ConversionState::Idle,
            blobs: BlobRegistry::new(),
            cancel: CancelHandle::default(),
        };
        controller.show_idle();
        controller
    }

    /// Replace the archive format used by [`Self::download_all`].
    pub fn with_archive_format(mut self, archive: Arc<dyn ArchiveFormat>) -> Self {
        self.archive = archive;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> ConversionState {
        self.state
    }

    /// Rendered pages of the most recent successful run, in page order.
    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    pub fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Consume the controller, keeping only what the view recorded.
    pub fn into_view(self) -> V {
        self.view
    }

    /// A handle that can cancel the current run from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Registry holding blobs handed to download targets.
    pub fn blob_registry(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Whether the download-all action is available.
    pub fn can_download_all(&self) -> bool {
        !self.pages.is_empty()
    }

    /// File name the archive would be delivered under right now.
    pub fn archive_file_name(&self) -> String {
        let base = self.source.as_ref().map(SourceFile::base_name);
        self.config.archive_name(base.as_deref())
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Pick or drop a file. `None` behaves like [`Self::clear`].
    ///
    /// A file whose declared media type is not exactly `application/pdf` is
    /// rejected: the source is cleared and convert disabled, but previously
    /// rendered pages stay available.
    pub fn select_source(&mut self, source: Option<SourceFile>) -> Result<(), Pdf2ImgError> {
        let Some(source) = source else {
            self.clear();
            return Ok(());
        };
        self.cancel.cancel();

        if !source.is_pdf() {
            warn!(
                "Rejected '{}': declared type {:?} is not a PDF",
                source.name(),
                source.media_type()
            );
            self.source = None;
            self.enter(ConversionState::Failed(FailureKind::InvalidFileType));
            self.view.show_file_info("Invalid file type");
            self.view.set_convert_action(false, CONVERT_LABEL);
            self.view.set_browse_label(CHOOSE_LABEL);
            return Err(Pdf2ImgError::InvalidFileType {
                name: source.name().to_string(),
                media_type: source.media_type().to_string(),
            });
        }

        info!("Selected {}", source.display_info());
        self.reset_output();
        self.enter(ConversionState::Ready);
        self.view.set_convert_action(true, CONVERT_LABEL);
        self.view.show_file_info(&source.display_info());
        self.view.set_browse_label(REPLACE_LABEL);
        self.source = Some(source);
        Ok(())
    }

    /// Drop the source and every rendered page.
    pub fn clear(&mut self) {
        self.cancel.cancel();
        self.source = None;
        self.show_idle();
    }

    // ── Conversion ────────────────────────────────────────────────────────

    /// Render every page of the selected source, strictly in order.
    ///
    /// The records of a previous run are discarded as soon as the run starts.
    /// On failure or cancellation nothing partial is kept.
    pub async fn convert(&mut self) -> Result<ConversionSummary, Pdf2ImgError> {
        let Some(source) = self.source.clone() else {
            self.view.show_status(&StatusLine::strong(NO_SOURCE_MESSAGE));
            return Err(Pdf2ImgError::NoSourceSelected);
        };

        let token = self.cancel.token();
        let total_start = Instant::now();
        info!("Starting conversion: {}", source.name());

        self.view.set_download_all_enabled(false);
        self.view.set_convert_action(false, CONVERTING_LABEL);
        self.pages.clear();
        self.view.clear_preview();
        self.view.show_pages_count("Rendering…");
        self.enter(ConversionState::Loading);

        let result = self.run(&source, token, total_start).await;

        self.view
            .set_convert_action(self.source.is_some(), CONVERT_LABEL);
        result
    }

    async fn run(
        &mut self,
        source: &SourceFile,
        token: u64,
        total_start: Instant,
    ) -> Result<ConversionSummary, Pdf2ImgError> {
        let payload = match source.read_payload().await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to read '{}': {}", source.name(), e);
                self.enter(ConversionState::Failed(FailureKind::ReadFailure));
                return Err(Pdf2ImgError::ReadFailed {
                    name: source.name().to_string(),
                    source: e,
                });
            }
        };
        let read_duration_ms = total_start.elapsed().as_millis() as u64;
        debug!("Read {} bytes in {} ms", payload.len(), read_duration_ms);

        if self.cancel.is_cancelled(token) {
            return Err(self.abort_cancelled());
        }

        self.enter(ConversionState::Parsing);
        let render_start = Instant::now();

        match self.render_pages(payload, token).await {
            Ok(total) => {
                let render_duration_ms = render_start.elapsed().as_millis() as u64;
                self.enter(ConversionState::Done { pages: total });
                self.view
                    .show_pages_count(&format!("{} rendered", pages_label(total)));
                self.view.set_download_all_enabled(self.can_download_all());
                info!(
                    "Converted {} in {} ms",
                    pages_label(total),
                    total_start.elapsed().as_millis()
                );

                Ok(ConversionSummary {
                    source: source.name().to_string(),
                    page_count: total,
                    pages: self.pages.iter().map(PageSummary::from).collect(),
                    stats: ConversionStats {
                        read_duration_ms,
                        render_duration_ms,
                        total_duration_ms: total_start.elapsed().as_millis() as u64,
                        scale: self.config.scale,
                    },
                })
            }
            Err(Pdf2ImgError::Cancelled) => Err(self.abort_cancelled()),
            Err(e) => {
                error!("Conversion of '{}' failed: {}", source.name(), e);
                self.reset_output();
                self.enter(ConversionState::Failed(FailureKind::ConversionFailure));
                Err(e)
            }
        }
    }

    /// Parse the payload and render pages `1..=N`, one at a time.
    async fn render_pages(&mut self, payload: Arc<[u8]>, token: u64) -> Result<usize, Pdf2ImgError> {
        let renderer = Arc::clone(&self.renderer);
        let document = renderer.load(payload).await?;
        if self.cancel.is_cancelled(token) {
            return Err(Pdf2ImgError::Cancelled);
        }

        let total = document.page_count();
        info!("PDF has {}", pages_label(total));
        self.view
            .show_pages_count(&format!("{} found", pages_label(total)));

        for page in 1..=total {
            self.enter(ConversionState::Rendering { page, total });

            let image = document.rasterize(page, self.config.scale).await?;
            if self.cancel.is_cancelled(token) {
                return Err(Pdf2ImgError::Cancelled);
            }

            let rendered = encode_page(page, &image)?;
            self.view.append_preview(&PreviewCard::for_page(&rendered));
            self.pages.push(rendered);
        }

        Ok(total)
    }

    fn abort_cancelled(&mut self) -> Pdf2ImgError {
        info!("Conversion cancelled");
        self.reset_output();
        self.enter(ConversionState::Cancelled);
        Pdf2ImgError::Cancelled
    }

    // ── Downloads ─────────────────────────────────────────────────────────

    /// Pack every rendered page into one archive and hand it to `target` as
    /// `<base-name>-images.zip`.
    ///
    /// Returns `Ok(None)` without touching anything when there is nothing to
    /// pack.
    pub async fn download_all(
        &mut self,
        target: &dyn DownloadTarget,
    ) -> Result<Option<DownloadReceipt>, Pdf2ImgError> {
        if self.pages.is_empty() {
            debug!("download_all ignored: no rendered pages");
            return Ok(None);
        }

        self.view.show_status(&StatusLine::strong(PACKING_MESSAGE));

        match self.pack_and_deliver(target).await {
            Ok(receipt) => {
                info!("Delivered {} ({} bytes)", receipt.file_name, receipt.size);
                self.view.show_status(&StatusLine::strong(ARCHIVE_DONE_MESSAGE));
                Ok(Some(receipt))
            }
            Err(e) => {
                error!("Archive download failed: {}", e);
                self.view
                    .show_status(&StatusLine::strong(ARCHIVE_FAILED_MESSAGE));
                Err(e)
            }
        }
    }

    async fn pack_and_deliver(
        &self,
        target: &dyn DownloadTarget,
    ) -> Result<DownloadReceipt, Pdf2ImgError> {
        let mut builder = self.archive.builder();
        for page in &self.pages {
            let name = page.file_name();
            let bytes = page.png_bytes().map_err(|e| ArchiveError::Write {
                entry: name.clone(),
                detail: e.to_string(),
            })?;
            builder.add_entry(&name, bytes)?;
        }

        let blob: Arc<[u8]> = Arc::from(builder.build().await?);
        let file_name = self.archive_file_name();
        let url = self.blobs.register(blob);
        let delivered = match self.blobs.resolve(&url) {
            Some(bytes) => target.save(&file_name, bytes).await,
            None => Err(Pdf2ImgError::Internal(format!("{} revoked before delivery", url))),
        };
        self.blobs.revoke_after(
            url,
            Duration::from_millis(self.config.blob_release_delay_ms),
        );
        delivered
    }

    /// Deliver one rendered page as `page-<index>.png`.
    pub async fn download_page(
        &self,
        page: usize,
        target: &dyn DownloadTarget,
    ) -> Result<DownloadReceipt, Pdf2ImgError> {
        let record = self
            .pages
            .iter()
            .find(|p| p.page == page)
            .ok_or(Pdf2ImgError::PageOutOfRange {
                page,
                total: self.pages.len(),
            })?;
        let bytes = record
            .png_bytes()
            .map_err(|e| Pdf2ImgError::Internal(format!("page {} data URL: {}", page, e)))?;
        target.save(&record.file_name(), Arc::from(bytes)).await
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    fn enter(&mut self, next: ConversionState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("State {} → {}", self.state, next);
        self.state = next;
        self.view.on_state(&next);
        self.view.show_status(&next.status());
    }

    /// Discard records and show the placeholder.
    fn reset_output(&mut self) {
        self.pages.clear();
        self.view.reset_preview();
        self.view.show_pages_count(&format!("{} rendered", pages_label(0)));
        self.view.set_download_all_enabled(false);
    }

    fn show_idle(&mut self) {
        self.reset_output();
        self.enter(ConversionState::Idle);
        self.view.set_convert_action(false, CONVERT_LABEL);
        self.view.show_file_info("No file selected");
        self.view.set_browse_label(CHOOSE_LABEL);
    }
}
