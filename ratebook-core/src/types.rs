use serde::{Deserialize, Serialize};

// ===== EXTRACTION TYPES =====
// What the external page extractor hands us. Everything after this point is
// format-agnostic and works on plain page text plus raw table cells.

/// One raw table as extracted from a page: rows of cells, first row is the header.
pub type RawTable = Vec<Vec<String>>;

/// Text and tables for a single physical page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Plain page text; `None` when the page yields no extractable text
    pub text: Option<String>,
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

impl PageContent {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: Some(text.into()),
            tables: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Page text, treating blank text the same as missing text.
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// All pages of one source file, tagged with its identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub name: String,
    pub pages: Vec<PageContent>,
}

impl DocumentInput {
    pub fn new(name: impl Into<String>, pages: Vec<PageContent>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }
}

/// Which parser(s) apply to a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Rules manual: hierarchical PART/Rule text
    Rules,
    /// Rate pages: numbered exhibit tables
    Rates,
    /// Both signals present in the name; run both parsers
    Both,
}

impl DocumentKind {
    pub fn parses_rules(self) -> bool {
        matches!(self, DocumentKind::Rules | DocumentKind::Both)
    }

    pub fn parses_exhibits(self) -> bool {
        matches!(self, DocumentKind::Rates | DocumentKind::Both)
    }
}

// ===== PARSED RECORDS =====

/// A contiguous block of rule text, e.g. "Rule C-7: Hurricane Deductibles".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleChunk {
    /// Rule identifier like "C-7"; unique within one source document only
    pub rule_id: String,
    pub title: String,
    /// PART letter in effect when the rule began
    pub part: Option<char>,
    pub part_name: Option<String>,
    pub start_page: u32,
    pub end_page: u32,
    /// Whitespace-collapsed body with bracketed annotations removed
    pub content: String,
    pub source_document: String,
}

/// One logical rate table, possibly assembled from several page fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibit {
    /// Normalized name like "Exhibit 6"; "Unknown" when the page names none
    pub exhibit_name: String,
    pub headers: Vec<String>,
    /// Data rows; lengths may differ from `headers` on extraction artifacts
    pub rows: Vec<Vec<String>>,
    pub source_document: String,
    /// `source_document:exhibit_name`
    pub exhibit_id: String,
    /// Contributing pages in ascending order
    pub page_range: Vec<u32>,
    /// Raw text of every contributing page, page-break delimited
    pub page_text: String,
}

impl Exhibit {
    /// Build a single-page fragment. The id is derived, never supplied.
    pub fn fragment(
        source_document: &str,
        exhibit_name: String,
        page_number: u32,
        table: &RawTable,
        page_text: &str,
    ) -> Option<Self> {
        let (headers, rows) = table.split_first()?;
        Some(Self {
            exhibit_id: exhibit_id(source_document, &exhibit_name),
            exhibit_name,
            headers: headers.clone(),
            rows: rows.to_vec(),
            source_document: source_document.to_string(),
            page_range: vec![page_number],
            page_text: page_text.to_string(),
        })
    }

    /// Representative (first) page.
    pub fn first_page(&self) -> u32 {
        self.page_range.first().copied().unwrap_or(0)
    }

    pub fn last_page(&self) -> u32 {
        self.page_range.last().copied().unwrap_or(0)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub fn exhibit_id(source_document: &str, exhibit_name: &str) -> String {
    format!("{source_document}:{exhibit_name}")
}

/// Per-file bookkeeping kept alongside the parsed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub name: String,
    pub kind: DocumentKind,
    pub page_count: usize,
    pub rule_count: usize,
    pub exhibit_count: usize,
}
