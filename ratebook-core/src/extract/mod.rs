//! Page extraction
//!
//! Converts a PDF into per-page text and raw tables. This is the boundary
//! between the binary document format and the format-agnostic parsers:
//!
//! ```text
//! PDF ──[PageBackend]──▶ Vec<PageContent> ──[parsers]──▶ rules / exhibits
//! ```

pub mod backends;

use crate::types::PageContent;
use anyhow::{bail, Result};
use std::path::Path;

pub use backends::sidecar::{sidecar_path, write_page_dump};
pub use backends::{PageBackend, SidecarBackend};

#[cfg(feature = "lopdf-backend")]
pub use backends::LopdfBackend;

/// Converts one source file into pages.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Vec<PageContent>>;

    /// Extractor name for debugging/logging
    fn name(&self) -> &str;

    fn supports_file_type(&self, path: &Path) -> bool {
        is_pdf(path)
    }
}

/// Case-insensitive `.pdf` extension check.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Backend enum for runtime backend selection
pub enum PageBackendImpl {
    Sidecar(SidecarBackend),
    #[cfg(feature = "lopdf-backend")]
    Lopdf(LopdfBackend),
}

impl PageBackend for PageBackendImpl {
    fn can_extract(&self, pdf_path: &Path) -> bool {
        match self {
            PageBackendImpl::Sidecar(backend) => backend.can_extract(pdf_path),
            #[cfg(feature = "lopdf-backend")]
            PageBackendImpl::Lopdf(backend) => backend.can_extract(pdf_path),
        }
    }

    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<PageContent>> {
        match self {
            PageBackendImpl::Sidecar(backend) => backend.extract_pages(pdf_path),
            #[cfg(feature = "lopdf-backend")]
            PageBackendImpl::Lopdf(backend) => backend.extract_pages(pdf_path),
        }
    }

    fn name(&self) -> &str {
        match self {
            PageBackendImpl::Sidecar(backend) => backend.name(),
            #[cfg(feature = "lopdf-backend")]
            PageBackendImpl::Lopdf(backend) => backend.name(),
        }
    }
}

/// PDF extractor trying its backends in order; the first backend that can
/// read a file wins.
pub struct PdfPageExtractor {
    backends: Vec<PageBackendImpl>,
}

impl Default for PdfPageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfPageExtractor {
    /// Page dumps first, then direct PDF text when compiled in.
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut backends = vec![PageBackendImpl::Sidecar(SidecarBackend::new())];
        #[cfg(feature = "lopdf-backend")]
        backends.push(PageBackendImpl::Lopdf(LopdfBackend::new()));
        Self { backends }
    }

    pub fn with_backends(backends: Vec<PageBackendImpl>) -> Self {
        Self { backends }
    }

    /// Only reads page dumps; never opens the PDF itself.
    pub fn sidecar_only() -> Self {
        Self::with_backends(vec![PageBackendImpl::Sidecar(SidecarBackend::new())])
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }
}

impl PageExtractor for PdfPageExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<PageContent>> {
        let Some(backend) = self.backends.iter().find(|b| b.can_extract(path)) else {
            bail!(
                "no backend can extract {} (tried: {})",
                path.display(),
                self.backend_names().join(", ")
            );
        };

        tracing::debug!("   📄 Extracting {} with {} backend", path.display(), backend.name());
        backend.extract_pages(path)
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("a.pdf")));
        assert!(is_pdf(Path::new("b.PDF")));
        assert!(!is_pdf(Path::new("c.pages.json")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn test_sidecar_wins_over_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let pdf = temp_dir.path().join("rates.pdf");
        std::fs::write(&pdf, b"not really a pdf").unwrap();
        write_page_dump(&sidecar_path(&pdf), &[PageContent::new(1, "Exhibit 1")]).unwrap();

        let pages = PdfPageExtractor::new().extract(&pdf).unwrap();

        assert_eq!(pages, vec![PageContent::new(1, "Exhibit 1")]);
    }

    #[test]
    fn test_no_backend_available() {
        let temp_dir = TempDir::new().unwrap();
        let pdf = temp_dir.path().join("missing.pdf");

        let err = PdfPageExtractor::sidecar_only().extract(&pdf).unwrap_err();
        assert!(err.to_string().contains("no backend can extract"));
    }
}
