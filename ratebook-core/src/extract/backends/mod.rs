//! Page extraction backends
//!
//! Every backend produces the same per-page shape: page number, plain text
//! and raw table cells. The parsers downstream never know which backend ran.

use crate::types::PageContent;
use anyhow::Result;
use std::path::Path;

/// Backend trait for page extraction
pub trait PageBackend: Send + Sync {
    /// Whether this backend has something to read for the given PDF
    fn can_extract(&self, pdf_path: &Path) -> bool;

    /// Extract every page of the document, in page order
    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<PageContent>>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;
}

pub mod sidecar;
pub use sidecar::SidecarBackend;

#[cfg(feature = "lopdf-backend")]
pub mod lopdf_text;

#[cfg(feature = "lopdf-backend")]
pub use lopdf_text::LopdfBackend;
