//! Text-only extraction straight from the PDF.
//!
//! lopdf exposes no table structure, so pages come back without tables:
//! rules manuals parse fully, rate pages yield no exhibits unless a page dump
//! is provided alongside.

use super::PageBackend;
use crate::types::PageContent;
use anyhow::{Context, Result};
use lopdf::Document;
use std::path::Path;

#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PageBackend for LopdfBackend {
    fn can_extract(&self, pdf_path: &Path) -> bool {
        pdf_path.is_file()
    }

    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<PageContent>> {
        let doc = Document::load(pdf_path)
            .with_context(|| format!("failed to load PDF {}", pdf_path.display()))?;

        // BTreeMap keyed by page number, already in order
        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_number| {
                let text = match doc.extract_text(&[page_number]) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        tracing::debug!(
                            "   ⚠️  No text on page {page_number} of {}: {e}",
                            pdf_path.display()
                        );
                        None
                    }
                };
                PageContent {
                    page_number,
                    text,
                    tables: Vec::new(),
                }
            })
            .collect();

        Ok(pages)
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}
