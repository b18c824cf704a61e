use super::merge::merge_fragments;
use super::patterns::exhibit_name_or_unknown;
use crate::config::MergeConfig;
use crate::types::{Exhibit, PageContent};

/// Turns rate pages into [`Exhibit`]s.
///
/// Every extracted table becomes a fragment named after the exhibit the
/// page text mentions; fragments of one exhibit on nearby pages are then
/// merged back into a single table.
pub struct ExhibitTableParser {
    merge: MergeConfig,
}

impl ExhibitTableParser {
    pub fn new(merge: MergeConfig) -> Self {
        Self { merge }
    }

    pub fn parse(&self, source_document: &str, pages: &[PageContent]) -> Vec<Exhibit> {
        let fragments = self.extract_fragments(source_document, pages);
        let fragment_count = fragments.len();
        let exhibits = merge_fragments(fragments, &self.merge);

        tracing::debug!(
            "   📊 {source_document}: {fragment_count} table fragments → {} exhibits",
            exhibits.len()
        );
        exhibits
    }

    /// One fragment per non-empty table, before any merging.
    pub fn extract_fragments(&self, source_document: &str, pages: &[PageContent]) -> Vec<Exhibit> {
        let mut fragments = Vec::new();

        for page in pages {
            let page_text = page.usable_text();

            for (table_index, table) in page.tables.iter().enumerate() {
                let exhibit_name = match page_text {
                    Some(text) => exhibit_name_or_unknown(text),
                    // Nothing to read a name from; keep the table addressable
                    None => format!("Table_{}_{}", page.page_number, table_index),
                };

                match Exhibit::fragment(
                    source_document,
                    exhibit_name,
                    page.page_number,
                    table,
                    page_text.unwrap_or_default(),
                ) {
                    Some(fragment) => fragments.push(fragment),
                    None => tracing::trace!(
                        "   ⏭️  Empty table {table_index} on page {} skipped",
                        page.page_number
                    ),
                }
            }
        }

        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn parser() -> ExhibitTableParser {
        ExhibitTableParser::new(MergeConfig::default())
    }

    #[test]
    fn test_named_table() {
        let pages = vec![PageContent::new(2, "Exhibit 1\nBase Rates")
            .with_table(table(&[&["Peril", "Base Rate"], &["Hurricane", "$293"]]))];

        let exhibits = parser().parse("CT Rate Pages.pdf", &pages);

        assert_eq!(exhibits.len(), 1);
        let exhibit = &exhibits[0];
        assert_eq!(exhibit.exhibit_name, "Exhibit 1");
        assert_eq!(exhibit.exhibit_id, "CT Rate Pages.pdf:Exhibit 1");
        assert_eq!(exhibit.headers, vec!["Peril".to_string(), "Base Rate".to_string()]);
        assert_eq!(exhibit.rows, vec![vec!["Hurricane".to_string(), "$293".to_string()]]);
        assert_eq!(exhibit.page_range, vec![2]);
        assert_eq!(exhibit.page_text, "Exhibit 1\nBase Rates");
    }

    #[test]
    fn test_unnamed_and_textless_pages() {
        let pages = vec![
            PageContent::new(3, "Territory definitions").with_table(table(&[&["Zone"], &["1"]])),
            PageContent {
                page_number: 4,
                text: None,
                tables: vec![table(&[&["Zone"], &["2"]]), table(&[&["Zone"], &["3"]])],
            },
        ];

        let fragments = parser().extract_fragments("rates", &pages);

        let names: Vec<&str> = fragments.iter().map(|f| f.exhibit_name.as_str()).collect();
        assert_eq!(names, vec!["Unknown", "Table_4_0", "Table_4_1"]);
        assert_eq!(fragments[1].page_text, "");
    }

    #[test]
    fn test_empty_tables_skipped_header_only_kept() {
        let pages = vec![PageContent::new(1, "Exhibit 2")
            .with_table(Vec::new())
            .with_table(table(&[&["Only", "Header"]]))];

        let exhibits = parser().parse("rates", &pages);

        assert_eq!(exhibits.len(), 1);
        assert_eq!(exhibits[0].row_count(), 0);
    }

    #[test]
    fn test_multi_page_exhibit_is_merged() {
        let pages = vec![
            PageContent::new(40, "Exhibit 6 Hurricane Deductible Factors")
                .with_table(table(&[&["Form", "Factor"], &["HO3", "2.061"]])),
            PageContent::new(41, "Exhibit 6 (continued)")
                .with_table(table(&[&["Form", "Factor"], &["HO4", "1.500"]])),
            PageContent::new(42, "Exhibit 7").with_table(table(&[&["Form", "Factor"], &["HO6", "1.0"]])),
        ];

        let exhibits = parser().parse("rates", &pages);

        assert_eq!(exhibits.len(), 2);
        assert_eq!(exhibits[0].exhibit_name, "Exhibit 6");
        assert_eq!(exhibits[0].row_count(), 2);
        assert_eq!(exhibits[0].page_range, vec![40, 41]);
        assert_eq!(exhibits[1].exhibit_name, "Exhibit 7");
    }

    #[test]
    fn test_same_name_in_other_document_stays_separate() {
        let pages = vec![PageContent::new(1, "Exhibit 6").with_table(table(&[&["A"], &["1"]]))];

        let first = parser().parse("a.pdf", &pages);
        let second = parser().parse("b.pdf", &pages);

        assert_ne!(first[0].exhibit_id, second[0].exhibit_id);
    }
}
