//! Collaborators the controller delegates to.
//!
//! ## Data Flow
//!
//! ```text
//! payload ──▶ render ──▶ encode ──▶ (records) ──▶ archive
//!  (bytes)    (pdfium)   (PNG data URL)            (zip)
//! ```
//!
//! 1. [`engine`]  — bind the pdfium shared library
//! 2. [`render`]  — load a document and rasterise one page at a time on a
//!    render thread that owns the parsed document
//! 3. [`encode`]  — PNG-encode each `DynamicImage` into a data URL
//! 4. [`archive`] — pack the rendered pages into one ZIP blob

pub mod archive;
pub mod encode;
pub mod engine;
pub mod render;
