//! Document rendering: the renderer seam and its pdfium implementation.
//!
//! The controller only sees [`DocumentRenderer`] and [`LoadedDocument`];
//! pdfium is one implementation of them. Tests plug in fakes.
//!
//! ## Document lifetime
//!
//! `PdfDocument` borrows the `Pdfium` instance, and neither may cross an
//! `.await`. Each loaded document therefore gets its own `pdfium-render`
//! thread that binds pdfium and parses the payload once, then serves page
//! requests from a channel until the [`LoadedDocument`] is dropped. Requests
//! are answered in the order they arrive.

use crate::error::RendererError;
use crate::output::DocumentMetadata;
use crate::pipeline::engine;
use futures::future::{BoxFuture, FutureExt};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Loads a PDF payload into something that can be rasterised page by page.
pub trait DocumentRenderer: Send + Sync {
    /// Parse the payload. Fails with [`RendererError::Parse`] (or
    /// [`RendererError::PasswordRequired`]) when the bytes are not a usable PDF.
    fn load(&self, payload: Arc<[u8]>)
        -> BoxFuture<'_, Result<Box<dyn LoadedDocument>, RendererError>>;
}

/// A parsed document.
pub trait LoadedDocument: Send + Sync {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Rasterise the 1-based `page` at `scale` device pixels per PDF point.
    fn rasterize(&self, page: usize, scale: f32) -> BoxFuture<'_, Result<DynamicImage, RendererError>>;
}

/// pdfium-backed [`DocumentRenderer`].
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2img::PdfiumRenderer;
///
/// let renderer = PdfiumRenderer::new()
///     .password("s3cret")
///     .max_rendered_pixels(4000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    library_path: Option<PathBuf>,
    password: Option<String>,
    max_rendered_pixels: Option<u32>,
}

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific pdfium library file or directory instead of the
    /// default resolution order.
    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// User password for encrypted documents.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Cap either rendered dimension, scaling the other proportionally.
    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.max_rendered_pixels = Some(px.max(16));
        self
    }

    /// Extract document metadata without rendering any page.
    pub async fn inspect(&self, payload: Arc<[u8]>) -> Result<DocumentMetadata, RendererError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.inspect_blocking(&payload))
            .await
            .map_err(|e| RendererError::Internal(format!("Metadata task panicked: {}", e)))?
    }

    async fn load_document(
        &self,
        payload: Arc<[u8]>,
    ) -> Result<Box<dyn LoadedDocument>, RendererError> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (requests, pending) = mpsc::unbounded_channel();
        let this = self.clone();
        std::thread::Builder::new()
            .name("pdfium-render".into())
            .spawn(move || this.serve(&payload, ready_tx, pending))
            .map_err(|e| RendererError::Internal(format!("Failed to start render thread: {}", e)))?;

        let page_count = ready_rx
            .await
            .map_err(|_| RendererError::Internal("Render thread exited while loading".into()))??;

        Ok(Box::new(PdfiumDocument {
            requests,
            page_count,
        }) as Box<dyn LoadedDocument>)
    }

    /// Body of a document's render thread.
    fn serve(
        &self,
        payload: &[u8],
        ready: oneshot::Sender<Result<usize, RendererError>>,
        mut pending: mpsc::UnboundedReceiver<PageRequest>,
    ) {
        let pdfium = match engine::bind_pdfium(self.library_path.as_deref()) {
            Ok(pdfium) => pdfium,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        let document = match self.open(&pdfium, payload) {
            Ok(document) => document,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        let count = document.pages().len() as usize;
        info!("PDF loaded: {} pages", count);
        if ready.send(Ok(count)).is_err() {
            return;
        }

        while let Some(request) = pending.blocking_recv() {
            let result = self.rasterize_page(&document, request.page, request.scale);
            let _ = request.reply.send(result);
        }
        debug!("Render thread finished");
    }

    fn open<'a>(
        &'a self,
        pdfium: &'a Pdfium,
        payload: &'a [u8],
    ) -> Result<PdfDocument<'a>, RendererError> {
        pdfium
            .load_pdf_from_byte_slice(payload, self.password.as_deref())
            .map_err(|e| {
                let detail = format!("{:?}", e);
                if detail.contains("Password") || detail.contains("password") {
                    RendererError::PasswordRequired
                } else {
                    RendererError::Parse { detail }
                }
            })
    }

    fn rasterize_page(
        &self,
        document: &PdfDocument<'_>,
        page_num: usize,
        scale: f32,
    ) -> Result<DynamicImage, RendererError> {
        let pages = document.pages();
        let total = pages.len() as usize;
        if page_num == 0 || page_num > total {
            return Err(RendererError::Render {
                page: page_num,
                detail: format!("no such page (document has {})", total),
            });
        }

        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| RendererError::Render {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let mut render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        if let Some(px) = self.max_rendered_pixels {
            render_config = render_config
                .set_maximum_width(px as i32)
                .set_maximum_height(px as i32);
        }

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RendererError::Render {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn inspect_blocking(&self, payload: &[u8]) -> Result<DocumentMetadata, RendererError> {
        let pdfium = engine::bind_pdfium(self.library_path.as_deref())?;
        let document = self.open(&pdfium, payload)?;

        let metadata = document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata
                .get(tag)
                .map(|t| t.value().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count: document.pages().len() as usize,
            pdf_version: format!("{:?}", document.version()),
        })
    }
}

impl DocumentRenderer for PdfiumRenderer {
    fn load(
        &self,
        payload: Arc<[u8]>,
    ) -> BoxFuture<'_, Result<Box<dyn LoadedDocument>, RendererError>> {
        self.load_document(payload).boxed()
    }
}

/// One page for a render thread to rasterise.
struct PageRequest {
    page: usize,
    scale: f32,
    reply: oneshot::Sender<Result<DynamicImage, RendererError>>,
}

/// A document held open by its render thread.
struct PdfiumDocument {
    requests: mpsc::UnboundedSender<PageRequest>,
    page_count: usize,
}

impl LoadedDocument for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn rasterize(&self, page: usize, scale: f32) -> BoxFuture<'_, Result<DynamicImage, RendererError>> {
        let (reply, response) = oneshot::channel();
        let queued = self
            .requests
            .send(PageRequest { page, scale, reply })
            .is_ok();
        async move {
            if !queued {
                return Err(RendererError::Internal("Render thread is gone".into()));
            }
            match response.await {
                Ok(result) => result,
                Err(_) => Err(RendererError::Internal(format!(
                    "Render thread dropped page {}",
                    page
                ))),
            }
        }
        .boxed()
    }
}
