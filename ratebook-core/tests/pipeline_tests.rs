//! Pipeline tests: folder of PDFs → corpus → queries.
//!
//! Each PDF is a placeholder file with a `.pages.json` page dump next to it,
//! so these tests exercise listing, classification, extraction, parsing,
//! merging and querying without a real PDF library.

use pretty_assertions::assert_eq;
use ratebook_core::extract::{sidecar_path, write_page_dump};
use ratebook_core::query::MatchedValue;
use ratebook_core::storage::NoOpStorage;
use ratebook_core::{
    calculate, BuildOptions, CorpusConfig, CorpusProcessor, DocumentClassifier, DocumentCorpus,
    DocumentKind, PageContent, PdfPageExtractor, QueryEngine, QueryResult, RenderOptions,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Fixture helpers
// ============================================================================

const RULES_PDF: &str = "CT Homeowners Rules.pdf";
const RATES_PDF: &str = "CT Homeowners Rate Pages.pdf";
const OTHER_RATES_PDF: &str = "NY Homeowners Rate Pages.pdf";

const EXHIBIT_6_HEADERS: [&str; 4] = ["Policy Form", "Coverage A", "Deductible", "Factor"];

fn write_document(dir: &Path, name: &str, pages: &[PageContent]) {
    let pdf = dir.join(name);
    fs::write(&pdf, b"%PDF-1.4 placeholder").unwrap();
    write_page_dump(&sidecar_path(&pdf), pages).unwrap();
}

fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn rules_pages() -> Vec<PageContent> {
    vec![
        PageContent::new(
            1,
            "PART A – GENERAL RULES\n\
             Rule A-1: Policy Period\n\
             Policies are written for one year.",
        ),
        PageContent::new(
            2,
            "PART C – RATING PLAN\n\
             Rule C-7: Hurricane Deductibles\n\
             A hurricane deductible applies to loss caused by a hurricane.\n\
             The deductible percentage is shown on the declarations page.",
        ),
        PageContent::new(
            3,
            "Rule C-8: Wind Mitigation\n\
             Credits apply to homes built to resist hurricane winds.",
        ),
    ]
}

/// One Exhibit 6 page: `row_count` filler rows, plus `extra` rows appended.
fn exhibit_6_page(page_number: u32, first_row: usize, row_count: usize, extra: &[[&str; 4]]) -> PageContent {
    let mut rows = vec![EXHIBIT_6_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    for i in first_row..first_row + row_count {
        rows.push(vec![
            "HO4".to_string(),
            format!("${},000", 100 + i),
            "5%".to_string(),
            format!("1.{:03}", i % 1000),
        ]);
    }
    rows.extend(extra.iter().map(|row| row.iter().map(|c| c.to_string()).collect()));

    PageContent::new(page_number, "Exhibit 6\nHurricane Deductible Factors").with_table(rows)
}

fn rate_pages() -> Vec<PageContent> {
    vec![
        PageContent::new(1, "Exhibit 1\nBase Rates").with_table(table(&[
            &["Peril", "Base Rate"],
            &["Hurricane", "$293"],
            &["Fire", "$120"],
        ])),
        exhibit_6_page(4, 0, 400, &[["HO3", "$750,000", "5%", "1.900"]]),
        exhibit_6_page(5, 400, 400, &[]),
        exhibit_6_page(6, 800, 400, &[["HO3", "$750,000", "2%", "2.061"]]),
    ]
}

fn other_rate_pages() -> Vec<PageContent> {
    vec![PageContent::new(2, "Exhibit 6\nHurricane Deductible Factors").with_table(table(&[
        &EXHIBIT_6_HEADERS,
        &["HO3", "$750,000", "2%", "1.850"],
    ]))]
}

fn build(dir: &Path) -> DocumentCorpus {
    let processor = CorpusProcessor::new_with_dependencies(
        Box::new(PdfPageExtractor::sidecar_only()),
        Box::new(NoOpStorage::new()),
        DocumentClassifier::default(),
    );
    processor
        .build_from_folder(dir, &CorpusConfig::default(), BuildOptions::default())
        .unwrap()
}

fn rating_folder() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_document(dir.path(), RULES_PDF, &rules_pages());
    write_document(dir.path(), RATES_PDF, &rate_pages());
    dir
}

const HO3_CRITERIA: [(&str, &str); 3] = [
    ("Policy Form", "HO3"),
    ("Coverage A", "$750,000"),
    ("Deductible", "2%"),
];

// ============================================================================
// Corpus construction
// ============================================================================

mod corpus_build {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn documents_are_classified_and_parsed() {
        let dir = rating_folder();
        let corpus = build(dir.path());

        let kinds: Vec<(&str, DocumentKind)> = corpus
            .documents()
            .iter()
            .map(|d| (d.name.as_str(), d.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(RATES_PDF, DocumentKind::Rates), (RULES_PDF, DocumentKind::Rules)]
        );

        let rule_ids: Vec<&str> = corpus.rules().iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(rule_ids, vec!["A-1", "C-7", "C-8"]);

        let hurricane = &corpus.rules()[1];
        assert_eq!(hurricane.title, "Hurricane Deductibles");
        assert_eq!(hurricane.part, Some('C'));
        assert_eq!(hurricane.part_name.as_deref(), Some("RATING PLAN"));
        assert_eq!(hurricane.source_document, RULES_PDF);

        // PART C carries over the page boundary
        assert_eq!(corpus.rules()[2].part, Some('C'));
    }

    #[test]
    fn exhibit_fragments_merge_across_pages() {
        let dir = rating_folder();
        let corpus = build(dir.path());

        let names: Vec<&str> = corpus.exhibits().iter().map(|e| e.exhibit_name.as_str()).collect();
        assert_eq!(names, vec!["Exhibit 1", "Exhibit 6"]);

        let exhibit_6 = &corpus.exhibits()[1];
        assert_eq!(exhibit_6.page_range, vec![4, 5, 6]);
        assert_eq!(exhibit_6.row_count(), 1202);
        assert_eq!(exhibit_6.exhibit_id, format!("{RATES_PDF}:Exhibit 6"));
        assert!(exhibit_6.page_text.contains("--- PAGE BREAK ---"));
    }
}

// ============================================================================
// Queries
// ============================================================================

mod queries {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hurricane_premium_end_to_end() {
        let dir = rating_folder();
        let corpus = build(dir.path());
        let engine = QueryEngine::with_defaults(&corpus);

        let base_rate = engine
            .find_value("Exhibit 1", &[("Peril", "Hurricane")], Some("Base Rate"))
            .found()
            .unwrap();
        assert_eq!(base_rate.cell(), Some("$293"));

        let factor = engine
            .find_value("Exhibit 6", &HO3_CRITERIA, Some("Factor"))
            .found()
            .unwrap();
        assert_eq!(factor.cell(), Some("2.061"));
        assert_eq!(factor.row_index, 1201);

        let premium = calculate(&format!(
            "{} * {}",
            base_rate.cell().unwrap(),
            factor.cell().unwrap()
        ))
        .unwrap();
        assert!((premium.value - 603.873).abs() < 1e-9);
        assert_eq!(premium.formatted_value(), "603.873");
    }

    #[test]
    fn titled_rule_outranks_passing_mention() {
        let dir = rating_folder();
        let corpus = build(dir.path());
        let engine = QueryEngine::with_defaults(&corpus);

        let hits = engine
            .search_rules("hurricane", None, None, None)
            .found()
            .unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.rule.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["C-7", "C-8"]);

        let phrase = engine
            .search_rules("hurricane deductible", None, None, None)
            .found()
            .unwrap();
        assert_eq!(phrase[0].rule.rule_id, "C-7");
    }

    #[test]
    fn part_lookup_and_listing() {
        let dir = rating_folder();
        let corpus = build(dir.path());
        let engine = QueryEngine::with_defaults(&corpus);

        let text = engine
            .find_part_by_description("rating plan")
            .render(&RenderOptions::default());
        assert!(text.starts_with("Best match: PART C - RATING PLAN\n"));

        let listing = engine.list_rules(Some('C')).render(&RenderOptions::default());
        assert_eq!(listing, "* Hurricane Deductibles\n* Wind Mitigation");
    }

    #[test]
    fn exhibit_lookup_is_case_insensitive() {
        let dir = rating_folder();
        let corpus = build(dir.path());
        let engine = QueryEngine::with_defaults(&corpus);

        let found = engine.find_exhibit("exhibit 1").found().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].exhibit_name, "Exhibit 1");
    }

    #[test]
    fn same_exhibit_name_in_two_documents() {
        let dir = rating_folder();
        write_document(dir.path(), OTHER_RATES_PDF, &other_rate_pages());
        let corpus = build(dir.path());
        let engine = QueryEngine::with_defaults(&corpus);

        let found = engine.find_exhibit("Exhibit 6").found().unwrap();
        let ids: Vec<&str> = found.iter().map(|e| e.exhibit_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "CT Homeowners Rate Pages.pdf:Exhibit 6",
                "NY Homeowners Rate Pages.pdf:Exhibit 6",
            ]
        );

        let ny: Vec<_> = corpus
            .exhibits_by_id("NY Homeowners Rate Pages.pdf:Exhibit 6")
            .collect();
        assert_eq!(ny.len(), 1);
        assert_eq!(ny[0].rows[0][3], "1.850");
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = rating_folder();
        let corpus = build(dir.path());
        let engine = QueryEngine::with_defaults(&corpus);

        let result = engine.find_value("Exhibit 6", &[("Territory", "12")], Some("Factor"));
        assert_eq!(
            result,
            QueryResult::ColumnNotFound {
                column: "Territory".to_string(),
                exhibit: "Exhibit 6".to_string(),
            }
        );
    }

    #[test]
    fn whole_row_without_return_column() {
        let dir = rating_folder();
        let corpus = build(dir.path());
        let engine = QueryEngine::with_defaults(&corpus);

        let row = engine.find_value("Exhibit 6", &HO3_CRITERIA, None).found().unwrap();
        assert_eq!(
            row.value,
            MatchedValue::Row {
                headers: EXHIBIT_6_HEADERS.iter().map(|h| h.to_string()).collect(),
                cells: vec![
                    "HO3".to_string(),
                    "$750,000".to_string(),
                    "2%".to_string(),
                    "2.061".to_string(),
                ],
            }
        );
    }
}

// ============================================================================
// Persistence
// ============================================================================

mod persistence {
    use super::*;
    use pretty_assertions::assert_eq;

    fn representative_answers(corpus: &DocumentCorpus) -> Vec<String> {
        let engine = QueryEngine::with_defaults(corpus);
        let options = RenderOptions::default();
        vec![
            engine.search_rules("hurricane deductible", None, None, None).render(&options),
            engine.find_part_by_description("general").render(&options),
            engine.list_rules(None).render(&options),
            engine.find_exhibit("Exhibit 6").render(&options),
            engine
                .find_value("Exhibit 6", &HO3_CRITERIA, Some("Factor"))
                .render(&options),
            engine.extract_table("Exhibit 1", Some("fire")).render(&options),
            engine
                .find_exhibit_by_description("deductible factors", None, None)
                .render(&options),
        ]
    }

    #[test]
    fn json_round_trip_answers_identically() {
        let dir = rating_folder();
        let corpus = build(dir.path());

        let out_dir = TempDir::new().unwrap();
        let path = out_dir.path().join("corpus.json");
        corpus.save_to_json(&path).unwrap();
        let reloaded = DocumentCorpus::load_from_json(&path).unwrap();

        assert_eq!(reloaded, corpus);
        assert_eq!(representative_answers(&reloaded), representative_answers(&corpus));
    }
}
