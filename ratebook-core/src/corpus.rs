use crate::classifier::DocumentClassifier;
use crate::config::CorpusConfig;
use crate::error::ConfigError;
use crate::parsers::{ExhibitTableParser, RuleSectionParser, TitleCleaner};
use crate::types::{DocumentInput, Exhibit, RuleChunk, SourceDocument};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every rule and exhibit parsed from one folder of documents.
///
/// Immutable once built: queries borrow it and never change it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentCorpus {
    rules: Vec<RuleChunk>,
    exhibits: Vec<Exhibit>,
    documents: Vec<SourceDocument>,
}

impl DocumentCorpus {
    /// Parse documents in the order given. Rules and exhibits keep document
    /// order, then within-document order.
    pub fn build(
        inputs: impl IntoIterator<Item = DocumentInput>,
        config: &CorpusConfig,
        classifier: &DocumentClassifier,
    ) -> Result<Self, ConfigError> {
        let mut builder = CorpusBuilder::new(config, classifier)?;
        for input in inputs {
            builder.add_document(input);
        }
        Ok(builder.finish())
    }

    /// Assemble a corpus from already-parsed records.
    pub fn from_parts(
        rules: Vec<RuleChunk>,
        exhibits: Vec<Exhibit>,
        documents: Vec<SourceDocument>,
    ) -> Self {
        Self {
            rules,
            exhibits,
            documents,
        }
    }

    pub fn rules(&self) -> &[RuleChunk] {
        &self.rules
    }

    pub fn exhibits(&self) -> &[Exhibit] {
        &self.exhibits
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.exhibits.is_empty()
    }

    /// Every exhibit carrying `exhibit_id`, in page order.
    ///
    /// Ids are per (document, name), so a table whose pages were not merged
    /// (a wide page gap or changed headers) yields several exhibits here.
    pub fn exhibits_by_id<'a>(&'a self, exhibit_id: &'a str) -> impl Iterator<Item = &'a Exhibit> + 'a {
        self.exhibits
            .iter()
            .filter(move |e| e.exhibit_id == exhibit_id)
    }

    pub fn rules_in<'a>(&'a self, source_document: &'a str) -> impl Iterator<Item = &'a RuleChunk> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.source_document == source_document)
    }

    pub fn exhibits_in<'a>(&'a self, source_document: &'a str) -> impl Iterator<Item = &'a Exhibit> + 'a {
        self.exhibits
            .iter()
            .filter(move |e| e.source_document == source_document)
    }

    /// Save corpus to JSON file
    pub fn save_to_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write corpus to {}", path.display()))
    }

    /// Load corpus from JSON file
    pub fn load_from_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read corpus from {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("invalid corpus file {}", path.display()))
    }
}

/// Accumulates a corpus one document at a time.
pub struct CorpusBuilder<'c> {
    classifier: &'c DocumentClassifier,
    rule_parser: RuleSectionParser,
    exhibit_parser: ExhibitTableParser,
    corpus: DocumentCorpus,
}

impl<'c> CorpusBuilder<'c> {
    pub fn new(config: &CorpusConfig, classifier: &'c DocumentClassifier) -> Result<Self, ConfigError> {
        let title_cleaner = TitleCleaner::new(&config.title_normalizations)?;
        Ok(Self {
            classifier,
            rule_parser: RuleSectionParser::new(title_cleaner),
            exhibit_parser: ExhibitTableParser::new(config.merge.clone()),
            corpus: DocumentCorpus::default(),
        })
    }

    pub fn add_document(&mut self, input: DocumentInput) {
        let kind = self.classifier.classify(&input.name);

        let rules = if kind.parses_rules() {
            self.rule_parser.parse(&input.name, &input.pages)
        } else {
            Vec::new()
        };
        let exhibits = if kind.parses_exhibits() {
            self.exhibit_parser.parse(&input.name, &input.pages)
        } else {
            Vec::new()
        };

        tracing::info!(
            "   📄 {}: {} pages, {} rules, {} exhibits",
            input.name,
            input.pages.len(),
            rules.len(),
            exhibits.len()
        );

        self.corpus.documents.push(SourceDocument {
            name: input.name,
            kind,
            page_count: input.pages.len(),
            rule_count: rules.len(),
            exhibit_count: exhibits.len(),
        });
        self.corpus.rules.extend(rules);
        self.corpus.exhibits.extend(exhibits);
    }

    pub fn document_count(&self) -> usize {
        self.corpus.documents.len()
    }

    pub fn finish(self) -> DocumentCorpus {
        self.corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentKind, PageContent};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_inputs() -> Vec<DocumentInput> {
        vec![
            DocumentInput::new(
                "CT Homeowner Rules.pdf",
                vec![PageContent::new(1, "PART A – GENERAL\nRule A-1: Scope\nApplies to dwellings")
                    .with_table(vec![vec!["ignored".to_string()], vec!["table".to_string()]])],
            ),
            DocumentInput::new(
                "CT Rate Pages.pdf",
                vec![PageContent::new(1, "Rule Z-9: Not parsed here\nExhibit 1").with_table(vec![
                    vec!["Peril".to_string(), "Rate".to_string()],
                    vec!["Fire".to_string(), "$10".to_string()],
                ])],
            ),
        ]
    }

    #[test]
    fn test_documents_routed_by_kind() {
        let corpus = DocumentCorpus::build(
            sample_inputs(),
            &CorpusConfig::default(),
            &DocumentClassifier::default(),
        )
        .unwrap();

        assert_eq!(corpus.rules().len(), 1);
        assert_eq!(corpus.rules()[0].source_document, "CT Homeowner Rules.pdf");
        assert_eq!(corpus.exhibits().len(), 1);
        assert_eq!(corpus.exhibits()[0].source_document, "CT Rate Pages.pdf");

        let kinds: Vec<DocumentKind> = corpus.documents().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DocumentKind::Rules, DocumentKind::Rates]);
        assert_eq!(corpus.documents()[1].exhibit_count, 1);
        assert_eq!(corpus.exhibits_by_id("CT Rate Pages.pdf:Exhibit 1").count(), 1);
        assert_eq!(corpus.rules_in("CT Rate Pages.pdf").count(), 0);
        assert_eq!(corpus.exhibits_in("CT Rate Pages.pdf").count(), 1);
    }

    #[test]
    fn test_both_kind_runs_both_parsers() {
        let input = DocumentInput::new(
            "Rules and Rate Manual.pdf",
            vec![PageContent::new(1, "Rule B-2: Rates\nsee table\nExhibit 2")
                .with_table(vec![vec!["A".to_string()], vec!["1".to_string()]])],
        );

        let corpus = DocumentCorpus::build(
            vec![input],
            &CorpusConfig::default(),
            &DocumentClassifier::default(),
        )
        .unwrap();

        assert_eq!(corpus.rules().len(), 1);
        assert_eq!(corpus.exhibits().len(), 1);
    }

    #[test]
    fn test_unmerged_pieces_share_an_id() {
        let piece = |page: u32, value: &str| {
            PageContent::new(page, "Exhibit 6").with_table(vec![
                vec!["Form".to_string(), "Factor".to_string()],
                vec!["HO3".to_string(), value.to_string()],
            ])
        };
        let input = DocumentInput::new("CT Rate Pages.pdf", vec![piece(1, "1.1"), piece(9, "9.9")]);

        let corpus = DocumentCorpus::build(
            vec![input],
            &CorpusConfig::default(),
            &DocumentClassifier::default(),
        )
        .unwrap();

        let pieces: Vec<&Exhibit> = corpus.exhibits_by_id("CT Rate Pages.pdf:Exhibit 6").collect();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].page_range, vec![1]);
        assert_eq!(pieces[1].page_range, vec![9]);
        assert_eq!(pieces[1].rows, vec![vec!["HO3".to_string(), "9.9".to_string()]]);
        assert_eq!(corpus.exhibits_by_id("CT Rate Pages.pdf:Exhibit 7").count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corpus.json");
        let corpus = DocumentCorpus::build(
            sample_inputs(),
            &CorpusConfig::default(),
            &DocumentClassifier::default(),
        )
        .unwrap();

        corpus.save_to_json(&path).unwrap();
        let loaded = DocumentCorpus::load_from_json(&path).unwrap();

        assert_eq!(loaded, corpus);
    }

    #[test]
    fn test_invalid_normalization_fails_build() {
        let mut config = CorpusConfig::default();
        config.title_normalizations.push(crate::config::TitleNormalization::new("[", "x"));

        let result = DocumentCorpus::build(Vec::<DocumentInput>::new(), &config, &DocumentClassifier::default());
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
