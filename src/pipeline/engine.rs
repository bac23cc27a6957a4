//! Binding to the pdfium shared library.
//!
//! Resolution order (first match wins):
//!
//! 1. An explicit path passed by the caller (file or directory).
//! 2. `PDFIUM_LIB_PATH` — file or directory.
//! 3. The platform library name in the current working directory.
//! 4. The system library search path.

use crate::error::RendererError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an existing pdfium library (or its directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium following the resolution order above.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, RendererError> {
    let configured = explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var(PDFIUM_LIB_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    });

    let bindings = match configured {
        Some(path) => {
            let lib = library_file(&path);
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib).map_err(|e| {
                RendererError::Binding(format!("'{}': {:?}", lib.display(), e))
            })?
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| RendererError::Binding(format!("{:?}", e)))?,
    };

    Ok(Pdfium::new(bindings))
}

/// If `path` is a directory, append the platform library file name.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
