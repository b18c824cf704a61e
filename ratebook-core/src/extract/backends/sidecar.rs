//! Pre-extracted page dumps stored next to the PDF.
//!
//! `Rate Pages.pdf` is read from `Rate Pages.pages.json`:
//!
//! ```json
//! { "pages": [ { "page_number": 1, "text": "Exhibit 1", "tables": [[["Peril", "Rate"], ["Fire", null]]] } ] }
//! ```
//!
//! This is how table-aware extractors (which live outside this crate) hand
//! their output over. `null` cells become empty strings.

use super::PageBackend;
use crate::types::PageContent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SIDECAR_EXTENSION: &str = "pages.json";

#[derive(Debug, Deserialize)]
struct PageDump {
    pages: Vec<DumpedPage>,
}

#[derive(Debug, Deserialize)]
struct DumpedPage {
    page_number: u32,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    tables: Vec<Vec<Vec<Option<String>>>>,
}

impl From<DumpedPage> for PageContent {
    fn from(page: DumpedPage) -> Self {
        let tables = page
            .tables
            .into_iter()
            .map(|table| {
                table
                    .into_iter()
                    .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
                    .collect()
            })
            .collect();

        PageContent {
            page_number: page.page_number,
            text: page.text,
            tables,
        }
    }
}

#[derive(Serialize)]
struct PageDumpRef<'a> {
    pages: &'a [PageContent],
}

/// Path of the page dump belonging to a PDF.
pub fn sidecar_path(pdf_path: &Path) -> PathBuf {
    pdf_path.with_extension(SIDECAR_EXTENSION)
}

/// Write pages in the format [`SidecarBackend`] reads.
pub fn write_page_dump(path: &Path, pages: &[PageContent]) -> Result<()> {
    let json = serde_json::to_string_pretty(&PageDumpRef { pages })?;
    fs::write(path, json).with_context(|| format!("failed to write page dump {}", path.display()))
}

#[derive(Debug, Default)]
pub struct SidecarBackend;

impl SidecarBackend {
    pub fn new() -> Self {
        Self
    }

    fn read_dump(&self, dump_path: &Path) -> Result<Vec<PageContent>> {
        let json = fs::read_to_string(dump_path)
            .with_context(|| format!("failed to read page dump {}", dump_path.display()))?;
        let dump: PageDump = serde_json::from_str(&json)
            .with_context(|| format!("invalid page dump {}", dump_path.display()))?;

        let mut pages: Vec<PageContent> = dump.pages.into_iter().map(PageContent::from).collect();
        pages.sort_by_key(|p| p.page_number);
        Ok(pages)
    }
}

impl PageBackend for SidecarBackend {
    fn can_extract(&self, pdf_path: &Path) -> bool {
        sidecar_path(pdf_path).is_file()
    }

    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<PageContent>> {
        self.read_dump(&sidecar_path(pdf_path))
    }

    fn name(&self) -> &str {
        "sidecar"
    }
}
