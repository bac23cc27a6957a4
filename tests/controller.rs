//! Controller behaviour against a scripted renderer.
//!
//! The renderer here produces tiny solid-colour images so every path of the
//! controller (success, parse/render failure, read failure, cancellation,
//! downloads) runs without pdfium.

use edgequake_pdf2img::{
    ArchiveBuilder, ArchiveError, ArchiveFormat, CancelHandle, ConversionConfig,
    ConversionController, ConversionState, DirectoryTarget, DocumentRenderer, FailureKind,
    HeadlessView, LoadedDocument, MemoryTarget, Pdf2ImgError, RendererError, SourceFile,
    PDF_MEDIA_TYPE,
};
use futures::future::{BoxFuture, FutureExt};
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Scripted renderer ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Script {
    pages: usize,
    fail_load: bool,
    fail_on_page: Option<usize>,
    cancel_on_page: Option<usize>,
}

#[derive(Clone, Default)]
struct FakeRenderer {
    script: Arc<Mutex<Script>>,
    events: Arc<Mutex<Vec<String>>>,
    cancel: Arc<Mutex<Option<CancelHandle>>>,
}

impl FakeRenderer {
    fn with_pages(pages: usize) -> Self {
        let r = Self::default();
        r.script.lock().unwrap().pages = pages;
        r
    }

    fn set(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.script.lock().unwrap());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl DocumentRenderer for FakeRenderer {
    fn load(
        &self,
        payload: Arc<[u8]>,
    ) -> BoxFuture<'_, Result<Box<dyn LoadedDocument>, RendererError>> {
        let script = self.script.lock().unwrap().clone();
        let doc = FakeDocument {
            script: script.clone(),
            events: Arc::clone(&self.events),
            cancel: self.cancel.lock().unwrap().clone(),
        };
        self.events
            .lock()
            .unwrap()
            .push(format!("load {}", payload.len()));
        async move {
            tokio::task::yield_now().await;
            if script.fail_load {
                return Err(RendererError::Parse {
                    detail: "not a PDF".into(),
                });
            }
            Ok(Box::new(doc) as Box<dyn LoadedDocument>)
        }
        .boxed()
    }
}

struct FakeDocument {
    script: Script,
    events: Arc<Mutex<Vec<String>>>,
    cancel: Option<CancelHandle>,
}

impl LoadedDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.script.pages
    }

    fn rasterize(
        &self,
        page: usize,
        scale: f32,
    ) -> BoxFuture<'_, Result<DynamicImage, RendererError>> {
        async move {
            self.events.lock().unwrap().push(format!("start {page}"));
            tokio::task::yield_now().await;
            self.events.lock().unwrap().push(format!("end {page}"));

            if self.script.cancel_on_page == Some(page) {
                if let Some(cancel) = &self.cancel {
                    cancel.cancel();
                }
            }
            if self.script.fail_on_page == Some(page) {
                return Err(RendererError::Render {
                    page,
                    detail: "corrupt content stream".into(),
                });
            }

            let w = (4.0 * scale) as u32 + page as u32;
            let h = (3.0 * scale) as u32;
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                w,
                h,
                Rgba([page as u8, 0, 0, 255]),
            )))
        }
        .boxed()
    }
}

/// Accepts entries but never produces an archive.
struct FailingArchive;

struct FailingBuilder(usize);

impl ArchiveFormat for FailingArchive {
    fn builder(&self) -> Box<dyn ArchiveBuilder> {
        Box::new(FailingBuilder(0))
    }
}

impl ArchiveBuilder for FailingBuilder {
    fn add_entry(&mut self, _name: &str, _bytes: Vec<u8>) -> Result<(), ArchiveError> {
        self.0 += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.0
    }

    fn build(self: Box<Self>) -> BoxFuture<'static, Result<Vec<u8>, ArchiveError>> {
        futures::future::ready(Err(ArchiveError::Internal("disk full".into()))).boxed()
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn pdf(name: &str) -> SourceFile {
    SourceFile::from_bytes(name, PDF_MEDIA_TYPE, b"%PDF-1.7 fake".to_vec())
}

fn controller(renderer: &FakeRenderer) -> ConversionController<HeadlessView> {
    controller_with(renderer, ConversionConfig::default())
}

fn controller_with(
    renderer: &FakeRenderer,
    config: ConversionConfig,
) -> ConversionController<HeadlessView> {
    let c = ConversionController::new(
        config,
        Arc::new(renderer.clone()) as Arc<dyn DocumentRenderer>,
        HeadlessView::default(),
    );
    *renderer.cancel.lock().unwrap() = Some(c.cancel_handle());
    c
}

fn zip_entries(blob: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(blob.to_vec())).expect("valid zip");
    (0..archive.len())
        .map(|i| {
            let mut f = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            f.read_to_end(&mut bytes).unwrap();
            (f.name().to_string(), bytes)
        })
        .collect()
}

fn page_indices(c: &ConversionController<HeadlessView>) -> Vec<usize> {
    c.pages().iter().map(|p| p.page).collect()
}

fn card_indices(c: &ConversionController<HeadlessView>) -> Vec<usize> {
    c.view().preview.cards().iter().map(|p| p.page).collect()
}

// ── Selection ────────────────────────────────────────────────────────────────

#[test]
fn starts_idle() {
    let c = controller(&FakeRenderer::with_pages(1));
    let v = c.view();
    assert_eq!(c.state(), ConversionState::Idle);
    assert_eq!(v.status.text, "Waiting for a PDF…");
    assert_eq!(v.file_info, "No file selected");
    assert_eq!(v.browse_label, "Choose PDF");
    assert!(!v.convert_enabled);
    assert!(!v.download_all_enabled);
    assert!(v.preview.is_placeholder());
    assert_eq!(v.pages_count, "0 pages rendered");
}

#[test]
fn valid_selection_enables_convert() {
    let mut c = controller(&FakeRenderer::with_pages(1));
    let source = SourceFile::from_bytes("report.pdf", PDF_MEDIA_TYPE, vec![0u8; 2048]);
    c.select_source(Some(source)).unwrap();

    let v = c.view();
    assert_eq!(c.state(), ConversionState::Ready);
    assert!(v.convert_enabled);
    assert_eq!(v.convert_label, "Convert to images");
    assert!(v.status.strong);
    assert!(v.status.text.starts_with("Ready to convert."));
    assert_eq!(v.file_info, "report.pdf · 2.0 KB");
    assert_eq!(v.browse_label, "Replace PDF");
}

#[test]
fn non_pdf_never_enables_convert() {
    let mut c = controller(&FakeRenderer::with_pages(1));
    let err = c
        .select_source(Some(SourceFile::from_bytes(
            "notes.txt",
            "text/plain",
            b"hello".to_vec(),
        )))
        .unwrap_err();

    assert!(matches!(err, Pdf2ImgError::InvalidFileType { .. }));
    let v = c.view();
    assert_eq!(c.state(), ConversionState::Failed(FailureKind::InvalidFileType));
    assert_eq!(v.status.text, "Please select a valid PDF file.");
    assert!(v.status.strong);
    assert_eq!(v.file_info, "Invalid file type");
    assert_eq!(v.browse_label, "Choose PDF");
    assert!(!v.convert_enabled);
    assert!(c.source().is_none());
}

#[test]
fn media_type_must_match_exactly() {
    let mut c = controller(&FakeRenderer::with_pages(1));
    for media_type in ["application/PDF", "application/pdf; charset=binary", ""] {
        let source = SourceFile::from_bytes("x.pdf", media_type, b"%PDF".to_vec());
        assert!(c.select_source(Some(source)).is_err(), "{media_type:?} accepted");
        assert!(!c.view().convert_enabled);
    }
}

#[tokio::test]
async fn invalid_selection_keeps_rendered_pages() {
    let renderer = FakeRenderer::with_pages(2);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("report.pdf"))).unwrap();
    c.convert().await.unwrap();

    let _ = c.select_source(Some(SourceFile::from_bytes("a.png", "image/png", vec![1])));

    assert_eq!(page_indices(&c), vec![1, 2]);
    assert_eq!(card_indices(&c), vec![1, 2]);
    assert!(c.view().download_all_enabled);
    assert!(!c.view().convert_enabled);
    // No source held any more: the archive falls back to the generic name.
    assert_eq!(c.archive_file_name(), "pdf-pages-images.zip");
}

#[tokio::test]
async fn new_selection_discards_previous_preview() {
    let renderer = FakeRenderer::with_pages(2);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();

    c.select_source(Some(pdf("b.pdf"))).unwrap();
    assert!(c.pages().is_empty());
    assert!(c.view().preview.is_placeholder());
    assert_eq!(c.view().pages_count, "0 pages rendered");
    assert!(!c.view().download_all_enabled);
}

#[tokio::test]
async fn clear_and_none_reset_to_idle() {
    let renderer = FakeRenderer::with_pages(1);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();

    c.select_source(None).unwrap();
    assert_eq!(c.state(), ConversionState::Idle);
    assert!(c.source().is_none());
    assert!(c.pages().is_empty());
    let v = c.view();
    assert_eq!(v.status.text, "Waiting for a PDF…");
    assert_eq!(v.file_info, "No file selected");
    assert!(!v.convert_enabled);
    assert!(!v.download_all_enabled);
    assert!(v.preview.is_placeholder());

    c.select_source(Some(pdf("b.pdf"))).unwrap();
    c.clear();
    assert_eq!(c.state(), ConversionState::Idle);
    assert_eq!(c.view().browse_label, "Choose PDF");
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_without_source_only_sets_status() {
    let mut c = controller(&FakeRenderer::with_pages(1));
    let before = c.view().clone();

    let err = c.convert().await.unwrap_err();
    assert!(matches!(err, Pdf2ImgError::NoSourceSelected));

    let after = c.view();
    assert_eq!(after.status.text, "No PDF selected yet.");
    assert!(after.status.strong);
    assert_eq!(c.state(), ConversionState::Idle);
    assert_eq!(after.history, before.history);
    assert_eq!(after.preview, before.preview);
    assert_eq!(after.convert_enabled, before.convert_enabled);
    assert_eq!(after.pages_count, before.pages_count);
}

#[tokio::test]
async fn every_page_rendered_in_order() {
    let renderer = FakeRenderer::with_pages(5);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("deck.pdf"))).unwrap();
    let summary = c.convert().await.unwrap();

    assert_eq!(summary.page_count, 5);
    assert_eq!(page_indices(&c), vec![1, 2, 3, 4, 5]);
    assert_eq!(card_indices(&c), vec![1, 2, 3, 4, 5]);

    let card = &c.view().preview.cards()[2];
    assert_eq!(card.label, "Page 3");
    assert_eq!(card.tag, "PNG");
    assert_eq!(card.download_name, "page-3.png");
    assert!(card.image.as_str().starts_with("data:image/png;base64,"));

    let history = &c.view().history;
    let tail: Vec<ConversionState> = history[history.len() - 8..].to_vec();
    assert_eq!(
        tail,
        vec![
            ConversionState::Loading,
            ConversionState::Parsing,
            ConversionState::Rendering { page: 1, total: 5 },
            ConversionState::Rendering { page: 2, total: 5 },
            ConversionState::Rendering { page: 3, total: 5 },
            ConversionState::Rendering { page: 4, total: 5 },
            ConversionState::Rendering { page: 5, total: 5 },
            ConversionState::Done { pages: 5 },
        ]
    );
}

#[tokio::test]
async fn pages_never_overlap() {
    let renderer = FakeRenderer::with_pages(3);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();

    let events = renderer.events();
    assert_eq!(
        events[1..],
        ["start 1", "end 1", "start 2", "end 2", "start 3", "end 3"]
    );
}

#[tokio::test]
async fn scale_reaches_the_renderer() {
    let renderer = FakeRenderer::with_pages(1);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();
    // 4 pt * 2.0 + page index
    assert_eq!((c.pages()[0].width, c.pages()[0].height), (9, 6));

    let config = ConversionConfig::builder().scale(4.0).build().unwrap();
    let mut c = controller_with(&renderer, config);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    let summary = c.convert().await.unwrap();
    assert_eq!((c.pages()[0].width, c.pages()[0].height), (17, 12));
    assert_eq!(summary.stats.scale, 4.0);
}

#[tokio::test]
async fn completion_updates_every_control() {
    let renderer = FakeRenderer::with_pages(3);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("report.pdf"))).unwrap();
    c.convert().await.unwrap();

    let v = c.view();
    assert_eq!(c.state(), ConversionState::Done { pages: 3 });
    assert_eq!(v.status.text, "Done. Converted 3 pages.");
    assert!(v.status.strong);
    assert_eq!(v.pages_count, "3 pages rendered");
    assert!(v.download_all_enabled);
    assert!(v.convert_enabled);
    assert_eq!(v.convert_label, "Convert to images");
}

#[tokio::test]
async fn single_page_uses_singular() {
    let renderer = FakeRenderer::with_pages(1);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();
    assert_eq!(c.view().status.text, "Done. Converted 1 page.");
    assert_eq!(c.view().pages_count, "1 page rendered");
}

#[tokio::test]
async fn empty_document_leaves_download_all_disabled() {
    let renderer = FakeRenderer::with_pages(0);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("empty.pdf"))).unwrap();
    let summary = c.convert().await.unwrap();

    assert_eq!(summary.page_count, 0);
    assert_eq!(c.state(), ConversionState::Done { pages: 0 });
    assert!(c.pages().is_empty());
    assert!(!c.view().download_all_enabled);
    assert!(c.view().convert_enabled);

    let target = MemoryTarget::new();
    assert!(c.download_all(&target).await.unwrap().is_none());
    assert!(target.files().is_empty());
}

#[tokio::test]
async fn parse_failure_shows_placeholder() {
    let renderer = FakeRenderer::with_pages(3);
    renderer.set(|s| s.fail_load = true);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("broken.pdf"))).unwrap();

    let err = c.convert().await.unwrap_err();
    assert!(matches!(
        err,
        Pdf2ImgError::ConversionFailed(RendererError::Parse { .. })
    ));

    let v = c.view();
    assert_eq!(c.state(), ConversionState::Failed(FailureKind::ConversionFailure));
    assert_eq!(
        v.status.text,
        "Something broke while reading the PDF. Try another file."
    );
    assert!(v.preview.is_placeholder());
    assert_eq!(v.pages_count, "0 pages rendered");
    assert!(c.pages().is_empty());
    assert!(!v.download_all_enabled);
    assert!(v.convert_enabled, "source is still held");
    assert_eq!(v.convert_label, "Convert to images");
}

#[tokio::test]
async fn render_failure_discards_partial_output() {
    let renderer = FakeRenderer::with_pages(4);
    renderer.set(|s| s.fail_on_page = Some(3));
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();

    let err = c.convert().await.unwrap_err();
    assert!(matches!(
        err,
        Pdf2ImgError::ConversionFailed(RendererError::Render { page: 3, .. })
    ));
    assert!(c.pages().is_empty());
    assert!(c.view().preview.is_placeholder());
    assert!(!c.view().download_all_enabled);
    assert!(!renderer.events().contains(&"start 4".to_string()));
}

#[tokio::test]
async fn failure_after_success_drops_earlier_pages() {
    let renderer = FakeRenderer::with_pages(2);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();
    assert!(c.view().download_all_enabled);

    renderer.set(|s| s.fail_on_page = Some(1));
    assert!(c.convert().await.is_err());
    assert!(c.pages().is_empty());
    assert!(!c.view().download_all_enabled);
    assert!(c.view().preview.is_placeholder());
}

#[tokio::test]
async fn read_failure_reports_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.pdf");
    std::fs::write(&path, b"%PDF-1.7").unwrap();

    let renderer = FakeRenderer::with_pages(1);
    let mut c = controller(&renderer);
    c.select_source(Some(SourceFile::from_path(&path).await.unwrap()))
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    let err = c.convert().await.unwrap_err();
    assert!(matches!(err, Pdf2ImgError::ReadFailed { .. }));
    assert_eq!(c.state(), ConversionState::Failed(FailureKind::ReadFailure));
    assert_eq!(
        c.view().status.text,
        "Could not read that file. Please try again."
    );
    assert!(c.view().convert_enabled);
    assert_eq!(c.view().convert_label, "Convert to images");
    assert!(renderer.events().is_empty(), "renderer must not be called");

    // The same source can be converted again once the file is back.
    std::fs::write(&path, b"%PDF-1.7").unwrap();
    c.convert().await.unwrap();
    assert_eq!(page_indices(&c), vec![1]);
}

#[tokio::test]
async fn second_run_replaces_the_first() {
    let renderer = FakeRenderer::with_pages(3);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();

    renderer.set(|s| s.pages = 2);
    c.convert().await.unwrap();
    assert_eq!(page_indices(&c), vec![1, 2]);
    assert_eq!(card_indices(&c), vec![1, 2]);
    assert_eq!(c.view().pages_count, "2 pages rendered");
}

#[tokio::test]
async fn cancel_discards_partial_output() {
    let renderer = FakeRenderer::with_pages(4);
    renderer.set(|s| s.cancel_on_page = Some(2));
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();

    let err = c.convert().await.unwrap_err();
    assert!(matches!(err, Pdf2ImgError::Cancelled));
    assert_eq!(c.state(), ConversionState::Cancelled);
    assert_eq!(c.view().status.text, "Conversion cancelled.");
    assert!(c.pages().is_empty());
    assert!(c.view().preview.is_placeholder());
    assert!(c.view().convert_enabled);
    assert!(!renderer.events().contains(&"start 3".to_string()));

    // A fresh run is not affected by the earlier cancel.
    renderer.set(|s| s.cancel_on_page = None);
    c.convert().await.unwrap();
    assert_eq!(page_indices(&c), vec![1, 2, 3, 4]);
}

// ── Downloads ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_pdf_downloads_as_report_images_zip() {
    let renderer = FakeRenderer::with_pages(3);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("report.pdf"))).unwrap();
    c.convert().await.unwrap();
    assert!(c.view().status.text.contains('3'));

    let target = MemoryTarget::new();
    let receipt = c.download_all(&target).await.unwrap().expect("archive");
    assert_eq!(receipt.file_name, "report-images.zip");
    assert_eq!(c.view().status.text, "ZIP downloaded. Enjoy ✨");

    let blob = target.get("report-images.zip").unwrap();
    let entries = zip_entries(&blob);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["page-1.png", "page-2.png", "page-3.png"]);
    for ((_, bytes), page) in entries.iter().zip(c.pages()) {
        assert_eq!(bytes, &page.png_bytes().unwrap());
    }
}

#[tokio::test]
async fn archive_name_strips_extension_case_insensitively() {
    let renderer = FakeRenderer::with_pages(1);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("Annual.Report.PDF"))).unwrap();
    c.convert().await.unwrap();
    assert_eq!(c.archive_file_name(), "Annual.Report-images.zip");

    c.select_source(Some(pdf("notes.pdf.bak"))).unwrap();
    assert_eq!(c.archive_file_name(), "notes.pdf.bak-images.zip");
}

#[tokio::test]
async fn archive_name_ignores_directories_in_source_name() {
    let renderer = FakeRenderer::with_pages(1);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("../../evil.pdf"))).unwrap();
    c.convert().await.unwrap();
    assert_eq!(c.archive_file_name(), "evil-images.zip");

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b");
    let receipt = c
        .download_all(&DirectoryTarget::new(&out))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(receipt.path.as_deref(), Some(out.join("evil-images.zip").as_path()));
    assert!(!dir.path().join("evil-images.zip").exists());
}

#[tokio::test]
async fn archive_failure_keeps_pages_and_download_all() {
    let renderer = FakeRenderer::with_pages(2);
    let mut c = controller(&renderer).with_archive_format(Arc::new(FailingArchive));
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();

    let target = MemoryTarget::new();
    let err = c.download_all(&target).await.unwrap_err();
    assert!(
        matches!(err, Pdf2ImgError::ArchiveFailed(ArchiveError::Internal(_))),
        "got {err:?}"
    );
    assert_eq!(
        c.view().status.text,
        "Could not build the ZIP. Please try again."
    );
    assert_eq!(c.state(), ConversionState::Done { pages: 2 });
    assert_eq!(page_indices(&c), vec![1, 2]);
    assert!(c.can_download_all());
    assert!(c.view().download_all_enabled);
    assert!(target.files().is_empty());
    assert_eq!(c.blob_registry().live_count(), 0);

    let view = c.into_view();
    assert_eq!(view.preview.cards().len(), 2);
}

#[tokio::test]
async fn download_all_without_pages_is_a_no_op() {
    let renderer = FakeRenderer::with_pages(2);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    let status = c.view().status.clone();

    let target = MemoryTarget::new();
    assert!(c.download_all(&target).await.unwrap().is_none());
    assert!(target.files().is_empty());
    assert_eq!(c.view().status, status);
}

#[tokio::test]
async fn archive_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::with_pages(2);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("scan.pdf"))).unwrap();
    c.convert().await.unwrap();

    let target = DirectoryTarget::new(dir.path());
    let receipt = c.download_all(&target).await.unwrap().unwrap();
    let path = dir.path().join("scan-images.zip");
    assert_eq!(receipt.path.as_deref(), Some(path.as_path()));
    assert_eq!(zip_entries(&std::fs::read(&path).unwrap()).len(), 2);
}

#[tokio::test]
async fn archive_blob_released_after_delay() {
    let renderer = FakeRenderer::with_pages(1);
    let config = ConversionConfig::builder()
        .blob_release_delay_ms(50)
        .build()
        .unwrap();
    let mut c = controller_with(&renderer, config);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();

    c.download_all(&MemoryTarget::new()).await.unwrap();
    assert_eq!(c.blob_registry().live_count(), 1);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(c.blob_registry().live_count(), 0);
}

#[tokio::test]
async fn single_page_download() {
    let renderer = FakeRenderer::with_pages(3);
    let mut c = controller(&renderer);
    c.select_source(Some(pdf("a.pdf"))).unwrap();
    c.convert().await.unwrap();

    let target = MemoryTarget::new();
    let receipt = c.download_page(2, &target).await.unwrap();
    assert_eq!(receipt.file_name, "page-2.png");
    let png = target.get("page-2.png").unwrap();
    assert_eq!(&png[..4], b"\x89PNG");

    let err = c.download_page(4, &target).await.unwrap_err();
    assert!(matches!(
        err,
        Pdf2ImgError::PageOutOfRange { page: 4, total: 3 }
    ));
    assert!(c.download_page(0, &target).await.is_err());
}
