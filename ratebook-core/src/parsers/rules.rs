use super::patterns::{clean_text, parse_part_header, parse_rule_header, PartHeader, RuleHeader, TitleCleaner};
use crate::types::{PageContent, RuleChunk};

/// Splits a rules manual into one [`RuleChunk`] per `Rule X-N:` header.
///
/// Lines are read in document order. A PART header changes the context for
/// rules that start after it; a rule header closes the open rule and starts a
/// new one; every other line is content of the open rule.
pub struct RuleSectionParser {
    title_cleaner: TitleCleaner,
}

impl RuleSectionParser {
    pub fn new(title_cleaner: TitleCleaner) -> Self {
        Self { title_cleaner }
    }

    pub fn parse(&self, source_document: &str, pages: &[PageContent]) -> Vec<RuleChunk> {
        let mut context = PartContext::default();
        let mut open_rule: Option<OpenRule> = None;
        let mut chunks = Vec::new();

        for page in pages {
            let Some(text) = page.usable_text() else {
                tracing::debug!(
                    "   ⏭️  {source_document} page {} has no text, skipping",
                    page.page_number
                );
                continue;
            };

            for line in text.lines() {
                if let Some(part) = parse_part_header(line) {
                    context.enter(part);
                    continue;
                }

                match parse_rule_header(line) {
                    Some(header) => {
                        if let Some(previous) = open_rule.take() {
                            chunks.extend(previous.finish(source_document));
                        }
                        open_rule = Some(OpenRule::begin(
                            header,
                            &context,
                            page.page_number,
                            &self.title_cleaner,
                        ));
                    }
                    None => {
                        // Text before the first rule header belongs to no rule
                        if let Some(rule) = open_rule.as_mut() {
                            rule.push_line(line, page.page_number);
                        }
                    }
                }
            }
        }

        if let Some(last) = open_rule.take() {
            chunks.extend(last.finish(source_document));
        }

        tracing::debug!("   📜 {source_document}: {} rules", chunks.len());
        chunks
    }
}

/// The PART in effect at the current reading position.
#[derive(Debug, Default)]
struct PartContext {
    current: Option<PartHeader>,
}

impl PartContext {
    fn enter(&mut self, part: PartHeader) {
        tracing::trace!("   📂 PART {} – {}", part.letter, part.name);
        self.current = Some(part);
    }

    fn letter(&self) -> Option<char> {
        self.current.as_ref().map(|p| p.letter)
    }

    fn name(&self) -> Option<String> {
        self.current.as_ref().map(|p| p.name.clone())
    }
}

/// A rule whose header has been seen but whose end has not.
struct OpenRule {
    rule_id: String,
    title: String,
    part: Option<char>,
    part_name: Option<String>,
    start_page: u32,
    end_page: u32,
    lines: Vec<String>,
}

impl OpenRule {
    fn begin(header: RuleHeader, context: &PartContext, page_number: u32, cleaner: &TitleCleaner) -> Self {
        Self {
            title: cleaner.clean(&header.raw_title),
            rule_id: header.rule_id,
            part: context.letter(),
            part_name: context.name(),
            start_page: page_number,
            end_page: page_number,
            lines: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str, page_number: u32) {
        self.lines.push(line.to_string());
        self.end_page = page_number;
    }

    /// A header followed directly by another header produces no chunk.
    fn finish(self, source_document: &str) -> Option<RuleChunk> {
        if self.lines.is_empty() {
            tracing::trace!("   ⏭️  Rule {} has no content, dropped", self.rule_id);
            return None;
        }

        Some(RuleChunk {
            rule_id: self.rule_id,
            title: self.title,
            part: self.part,
            part_name: self.part_name,
            start_page: self.start_page,
            end_page: self.end_page,
            content: clean_text(&self.lines.join("\n")),
            source_document: source_document.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> RuleSectionParser {
        RuleSectionParser::new(TitleCleaner::default())
    }

    #[test]
    fn test_rule_with_part_context() {
        let pages = vec![PageContent::new(
            12,
            "PART C – RATING PLAN\nRule C-7: Hurricane Deductibles\nThe deductible applies [deleted] to\nhurricane losses.",
        )];

        let rules = parser().parse("CT Rules.pdf", &pages);

        assert_eq!(
            rules,
            vec![RuleChunk {
                rule_id: "C-7".to_string(),
                title: "Hurricane Deductibles".to_string(),
                part: Some('C'),
                part_name: Some("RATING PLAN".to_string()),
                start_page: 12,
                end_page: 12,
                content: "The deductible applies to hurricane losses.".to_string(),
                source_document: "CT Rules.pdf".to_string(),
            }]
        );
    }

    #[test]
    fn test_rule_spanning_pages() {
        let pages = vec![
            PageContent::new(3, "Rule A-1: Definitions\nFirst part"),
            PageContent::new(4, "continued on next page"),
            PageContent::new(5, "Rule A-2: Eligibility\nOnly owners"),
        ];

        let rules = parser().parse("manual", &pages);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rule_id, "A-1");
        assert_eq!(rules[0].start_page, 3);
        assert_eq!(rules[0].end_page, 4);
        assert_eq!(rules[0].content, "First part continued on next page");
        assert_eq!(rules[0].part, None);
        assert_eq!((rules[1].start_page, rules[1].end_page), (5, 5));
    }

    #[test]
    fn test_header_without_content_is_dropped() {
        let pages = vec![PageContent::new(
            1,
            "Rule C-1: Empty\nRule C-2: Has content\nbody",
        )];

        let rules = parser().parse("manual", &pages);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_id, "C-2");
    }

    #[test]
    fn test_part_change_applies_to_later_rules_only() {
        let pages = vec![PageContent::new(
            1,
            "PART A – GENERAL RULES\nRule A-1: Scope\nscope text\nPART B – COVERAGES\nmore scope text\nRule B-1: Coverage A\ndwelling",
        )];

        let rules = parser().parse("manual", &pages);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].part, Some('A'));
        // The PART line is a header, not content
        assert_eq!(rules[0].content, "scope text more scope text");
        assert_eq!(rules[1].part, Some('B'));
        assert_eq!(rules[1].part_name.as_deref(), Some("COVERAGES"));
    }

    #[test]
    fn test_text_before_first_rule_and_blank_pages_are_ignored() {
        let pages = vec![
            PageContent::new(1, "Table of contents\nRule listing follows"),
            PageContent {
                page_number: 2,
                text: None,
                tables: Vec::new(),
            },
            PageContent::new(3, "   "),
            PageContent::new(4, "Rule D-3: Payment\nterms"),
        ];

        let rules = parser().parse("manual", &pages);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].start_page, 4);
        assert_eq!(rules[0].content, "terms");
    }

    #[test]
    fn test_titles_are_cleaned() {
        let pages = vec![PageContent::new(
            1,
            "Rule C-9: Distance to Coast FactorSECONDARY RESIDENCE\nbody",
        )];

        let rules = parser().parse("manual", &pages);

        assert_eq!(rules[0].title, "Distance to Coast Factor");
    }

    #[test]
    fn test_no_rules() {
        let pages = vec![PageContent::new(1, "Just prose, no rule headers.")];
        assert!(parser().parse("manual", &pages).is_empty());
        assert!(parser().parse("manual", &[]).is_empty());
    }
}
