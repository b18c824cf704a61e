//! Plain-text rendering of query results for an agent or terminal.

use crate::config::LimitsConfig;
use crate::query::{
    Calculation, ExhibitHit, ExhibitSummary, MatchedValue, PartMatch, QueryResult, RowSelection,
    RuleHit, RuleListing, TableView, ValueMatch,
};
use crate::types::{Exhibit, SourceDocument};
use std::fmt::Write;

const RECORD_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Characters of rule content shown per hit
    pub content_preview_chars: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for RenderOptions {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            content_preview_chars: limits.content_preview_chars,
        }
    }
}

/// Text form of a query outcome.
pub trait AgentText {
    /// Message when the corpus holds nothing of this kind.
    const NO_DATA: &'static str;

    fn agent_text(&self, options: &RenderOptions) -> String;
}

impl<T: AgentText> QueryResult<T> {
    pub fn render(&self, options: &RenderOptions) -> String {
        match self {
            QueryResult::Found(value) => value.agent_text(options),
            QueryResult::NoData => T::NO_DATA.to_string(),
            QueryResult::NotFound { reason } => reason.clone(),
            QueryResult::ColumnNotFound { column, exhibit } => {
                format!("Column '{column}' not found in {exhibit}.")
            }
        }
    }
}

impl AgentText for Vec<RuleHit<'_>> {
    const NO_DATA: &'static str = "No rules data available.";

    fn agent_text(&self, options: &RenderOptions) -> String {
        self.iter()
            .map(|hit| {
                let rule = hit.rule;
                let mut text = format!("Rule {}: {}\n", rule.rule_id, rule.title);
                if let Some(part) = rule.part {
                    let _ = writeln!(
                        text,
                        "Part {part} ({})",
                        rule.part_name.as_deref().unwrap_or("unnamed")
                    );
                }
                let _ = writeln!(text, "Pages {}-{}", rule.start_page, rule.end_page);
                let _ = writeln!(text, "Source: {}", rule.source_document);
                let _ = writeln!(
                    text,
                    "Content: {}",
                    preview(&rule.content, options.content_preview_chars)
                );
                text
            })
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
    }
}

impl AgentText for PartMatch {
    const NO_DATA: &'static str = "No rules data available.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        match self {
            PartMatch::Best { best, alternatives } => {
                let mut text = format!(
                    "Best match: PART {} - {}\n",
                    best.part.letter, best.part.name
                );
                if !alternatives.is_empty() {
                    text.push_str("\nOther possible matches:\n");
                    for alternative in alternatives {
                        let _ = writeln!(
                            text,
                            "  PART {}: {}",
                            alternative.part.letter, alternative.part.name
                        );
                    }
                }
                text
            }
            PartMatch::NoMatch { available } => {
                let mut text = String::from("No exact match found. Available PARTs:\n");
                for part in available {
                    let _ = writeln!(text, "  PART {}: {}", part.letter, part.name);
                }
                text
            }
        }
    }
}

impl AgentText for Vec<RuleListing> {
    const NO_DATA: &'static str = "No rules data available.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        self.iter()
            .map(|listing| format!("* {}", listing.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn summary_text(summary: &ExhibitSummary) -> String {
    format!(
        "Exhibit: {}\nId: {}\nSource: {}\nPages: {}\nHeaders: {}\nRows: {}\n",
        summary.exhibit_name,
        summary.exhibit_id,
        summary.source_document,
        page_list(&summary.page_range),
        cell_list(&summary.headers),
        summary.row_count
    )
}

impl AgentText for Vec<&Exhibit> {
    const NO_DATA: &'static str = "No table data available.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        self.iter()
            .map(|exhibit| summary_text(&ExhibitSummary::from(*exhibit)))
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
    }
}

impl AgentText for Vec<ExhibitHit<'_>> {
    const NO_DATA: &'static str = "No table data available.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        self.iter()
            .map(|hit| {
                format!(
                    "{}Score: {}\n",
                    summary_text(&ExhibitSummary::from(hit.exhibit)),
                    hit.score
                )
            })
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
    }
}

impl AgentText for ValueMatch {
    const NO_DATA: &'static str = "No table data available.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        match &self.value {
            MatchedValue::Cell { value, .. } => value.clone(),
            MatchedValue::Row { cells, .. } => format!("Matching row: {}", cell_list(cells)),
        }
    }
}

impl AgentText for Vec<TableView> {
    const NO_DATA: &'static str = "No table data available.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        self.iter()
            .map(|view| {
                let mut text = summary_text(&view.summary);
                match &view.selection {
                    RowSelection::Sample => {
                        let _ = writeln!(text, "\nSample rows (first {}):", view.rows.len());
                        for (index, row) in view.rows.iter().enumerate() {
                            let _ = writeln!(text, "  Row {index}: {}", cell_list(row));
                        }
                    }
                    RowSelection::Matching {
                        description,
                        total_matches: 0,
                    } => {
                        let _ = writeln!(text, "\nNo rows matching '{description}' found.");
                    }
                    RowSelection::Matching { total_matches, .. } => {
                        let _ = writeln!(text, "\nMatching rows ({total_matches}):");
                        for row in &view.rows {
                            let _ = writeln!(text, "  {}", cell_list(row));
                        }
                    }
                }
                text
            })
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
    }
}

impl AgentText for Vec<&SourceDocument> {
    const NO_DATA: &'static str = "No documents loaded.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        self.iter()
            .map(|document| {
                format!(
                    "{} ({:?}): {} pages, {} rules, {} exhibits",
                    document.name,
                    document.kind,
                    document.page_count,
                    document.rule_count,
                    document.exhibit_count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl AgentText for Calculation {
    const NO_DATA: &'static str = "Nothing to calculate.";

    fn agent_text(&self, _options: &RenderOptions) -> String {
        format!("{} = {}", self.expression, self.formatted_value())
    }
}

/// First `max_chars` characters, with an ellipsis when cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

fn cell_list(cells: &[String]) -> String {
    let quoted: Vec<String> = cells.iter().map(|cell| format!("'{cell}'")).collect();
    format!("[{}]", quoted.join(", "))
}

fn page_list(pages: &[u32]) -> String {
    match (pages.first(), pages.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) if last.saturating_sub(*first) as usize + 1 == pages.len() => {
            format!("{first}-{last}")
        }
        _ => pages
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests_support::{corpus_with_exhibits, corpus_with_rules, exhibit};
    use crate::query::{calculate, QueryEngine};
    use crate::types::RuleChunk;
    use pretty_assertions::assert_eq;

    fn hurricane_rule(content: &str) -> RuleChunk {
        RuleChunk {
            rule_id: "C-7".to_string(),
            title: "Hurricane Deductibles".to_string(),
            part: Some('C'),
            part_name: Some("RATING PLAN".to_string()),
            start_page: 12,
            end_page: 13,
            content: content.to_string(),
            source_document: "CT Homeowners Rules.pdf".to_string(),
        }
    }

    #[test]
    fn test_rule_hit_text() {
        let corpus = corpus_with_rules(vec![hurricane_rule("Hurricane deductibles apply.")]);
        let engine = QueryEngine::with_defaults(&corpus);

        let text = engine
            .search_rules("hurricane", None, None, None)
            .render(&RenderOptions::default());

        assert_eq!(
            text,
            "Rule C-7: Hurricane Deductibles\n\
             Part C (RATING PLAN)\n\
             Pages 12-13\n\
             Source: CT Homeowners Rules.pdf\n\
             Content: Hurricane deductibles apply.\n"
        );
    }

    #[test]
    fn test_rule_content_is_truncated() {
        let long = "hurricane ".repeat(100);
        let corpus = corpus_with_rules(vec![hurricane_rule(&long)]);
        let engine = QueryEngine::with_defaults(&corpus);

        let text = engine
            .search_rules("hurricane", None, None, None)
            .render(&RenderOptions {
                content_preview_chars: 20,
            });

        assert!(text.contains("Content: hurricane hurricane ...\n"));
    }

    #[test]
    fn test_absence_messages() {
        let empty = corpus_with_rules(Vec::new());
        let engine = QueryEngine::with_defaults(&empty);
        let options = RenderOptions::default();

        assert_eq!(
            engine.search_rules("anything", None, None, None).render(&options),
            "No rules data available."
        );
        assert_eq!(
            engine.find_exhibit("Exhibit 1").render(&options),
            "No table data available."
        );

        let column: QueryResult<ValueMatch> = QueryResult::ColumnNotFound {
            column: "Form".to_string(),
            exhibit: "Exhibit 6".to_string(),
        };
        assert_eq!(column.render(&options), "Column 'Form' not found in Exhibit 6.");
    }

    #[test]
    fn test_table_views() {
        let corpus = corpus_with_exhibits(vec![exhibit(
            "CT Rate Pages.pdf",
            "Exhibit 1",
            4,
            "Exhibit 1 Base Rates",
            &[&["Peril", "Base Rate"], &["Hurricane", "$293"], &["Fire", "$120"]],
        )]);
        let engine = QueryEngine::with_defaults(&corpus);
        let options = RenderOptions::default();

        let sample = engine.extract_table("exhibit 1", None).render(&options);
        assert!(sample.starts_with("Exhibit: Exhibit 1\nId: CT Rate Pages.pdf:Exhibit 1\n"));
        assert!(sample.contains("Pages: 4\n"));
        assert!(sample.contains("Headers: ['Peril', 'Base Rate']\n"));
        assert!(sample.contains("  Row 1: ['Fire', '$120']\n"));

        let matching = engine.extract_table("Exhibit 1", Some("hurricane")).render(&options);
        assert!(matching.contains("Matching rows (1):\n  ['Hurricane', '$293']\n"));

        let none = engine.extract_table("Exhibit 1", Some("flood")).render(&options);
        assert!(none.contains("No rows matching 'flood' found."));
    }

    #[test]
    fn test_value_and_calculation() {
        let corpus = corpus_with_exhibits(vec![exhibit(
            "CT Rate Pages.pdf",
            "Exhibit 1",
            4,
            "",
            &[&["Peril", "Base Rate"], &["Hurricane", "$293"]],
        )]);
        let engine = QueryEngine::with_defaults(&corpus);
        let options = RenderOptions::default();

        let value = engine.find_value("Exhibit 1", &[("Peril", "Hurricane")], Some("Base Rate"));
        assert_eq!(value.render(&options), "$293");

        let row = engine.find_value("Exhibit 1", &[("Peril", "Hurricane")], None);
        assert_eq!(row.render(&options), "Matching row: ['Hurricane', '$293']");

        let calculation = calculate("293 * 2.061").unwrap();
        assert_eq!(calculation.agent_text(&options), "293 * 2.061 = 603.873");
    }

    #[test]
    fn test_preview_and_page_list() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
        assert_eq!(preview("ééé", 2), "éé...");
        assert_eq!(page_list(&[5, 6, 7]), "5-7");
        assert_eq!(page_list(&[5, 8]), "5, 8");
        assert_eq!(page_list(&[]), "");
    }
}
