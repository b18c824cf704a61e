use super::{contains_lower, document_matches, QueryEngine, QueryResult};
use crate::parsers::patterns::rule_number;
use crate::types::RuleChunk;
use serde::Serialize;
use std::collections::HashSet;

/// A rule with its keyword score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleHit<'a> {
    pub score: u32,
    pub rule: &'a RuleChunk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartInfo {
    pub letter: char,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredPart {
    pub part: PartInfo,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum PartMatch {
    Best {
        best: ScoredPart,
        alternatives: Vec<ScoredPart>,
    },
    /// Nothing scored; every known PART, sorted by letter
    NoMatch { available: Vec<PartInfo> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleListing {
    pub rule_id: String,
    pub title: String,
}

impl<'a> QueryEngine<'a> {
    /// Keyword search over rule titles, content and ids.
    pub fn search_rules(
        &self,
        query: &str,
        part_filter: Option<char>,
        document_filter: Option<&str>,
        top_k: Option<usize>,
    ) -> QueryResult<Vec<RuleHit<'a>>> {
        let rules = self.corpus.rules();
        if rules.is_empty() {
            return QueryResult::NoData;
        }

        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return QueryResult::not_found("Search query is empty.");
        }

        let mut hits: Vec<RuleHit<'a>> = rules
            .iter()
            .filter(|rule| part_filter.is_none() || rule.part == part_filter)
            .filter(|rule| document_matches(&rule.source_document, document_filter))
            .map(|rule| RuleHit {
                score: self.score_rule(rule, &query_lower),
                rule,
            })
            .filter(|hit| hit.score > 0)
            .collect();

        if hits.is_empty() {
            return QueryResult::not_found(format!("No rules found matching '{query}'."));
        }

        // Stable: ties keep corpus order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        // Zero means "use the default", never an empty hit list
        let top_k = top_k.filter(|&k| k > 0).unwrap_or(self.limits.rules_top_k);
        hits.truncate(top_k);
        QueryResult::Found(hits)
    }

    fn score_rule(&self, rule: &RuleChunk, query_lower: &str) -> u32 {
        let mut score = 0;
        if contains_lower(&rule.title, query_lower) {
            score += self.scoring.title_match_weight;
        }

        let occurrences = rule.content.to_lowercase().matches(query_lower).count() as u32;
        score += occurrences * self.scoring.content_occurrence_weight;

        if contains_lower(&rule.rule_id, query_lower) {
            score += self.scoring.rule_id_match_weight;
        }
        score
    }

    /// Which PART a description like "rating plan" refers to.
    pub fn find_part_by_description(&self, description: &str) -> QueryResult<PartMatch> {
        if self.corpus.rules().is_empty() {
            return QueryResult::NoData;
        }

        let parts = self.known_parts();
        if parts.is_empty() {
            return QueryResult::not_found("No PART information found.");
        }

        let description_lower = description.trim().to_lowercase();
        if description_lower.is_empty() {
            return QueryResult::not_found("PART description is empty.");
        }

        let words: Vec<&str> = description_lower
            .split_whitespace()
            .filter(|w| w.chars().count() >= self.scoring.part_word_min_len)
            .collect();

        let mut scored: Vec<ScoredPart> = parts
            .iter()
            .map(|part| {
                let name_lower = part.name.to_lowercase();
                let mut score = 0;
                if name_lower.contains(&description_lower) {
                    score += self.scoring.part_phrase_weight;
                }
                for word in &words {
                    if name_lower.contains(word) {
                        score += self.scoring.part_word_weight;
                    }
                }
                ScoredPart {
                    part: part.clone(),
                    score,
                }
            })
            .filter(|scored| scored.score > 0)
            .collect();

        if scored.is_empty() {
            let mut available = parts;
            available.sort_by(|a, b| a.letter.cmp(&b.letter));
            return QueryResult::Found(PartMatch::NoMatch { available });
        }

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        let mut ranked = scored.into_iter();
        let best = match ranked.next() {
            Some(best) => best,
            None => return QueryResult::not_found("No PART information found."),
        };
        let alternatives = ranked.take(self.limits.part_alternatives).collect();

        QueryResult::Found(PartMatch::Best { best, alternatives })
    }

    /// Distinct (letter, name) pairs in first-seen order.
    fn known_parts(&self) -> Vec<PartInfo> {
        let mut seen = HashSet::new();
        let mut parts = Vec::new();
        for rule in self.corpus.rules() {
            if let (Some(letter), Some(name)) = (rule.part, rule.part_name.as_ref()) {
                if seen.insert((letter, name.as_str())) {
                    parts.push(PartInfo {
                        letter,
                        name: name.clone(),
                    });
                }
            }
        }
        parts
    }

    /// Rule titles, one per rule id, in numeric order.
    pub fn list_rules(&self, part_filter: Option<char>) -> QueryResult<Vec<RuleListing>> {
        if self.corpus.rules().is_empty() {
            return QueryResult::NoData;
        }

        let prefix = part_filter.map(|letter| format!("{letter}-"));
        let mut seen = HashSet::new();
        let mut listings: Vec<RuleListing> = self
            .corpus
            .rules()
            .iter()
            .filter(|rule| match &prefix {
                Some(prefix) => rule.rule_id.starts_with(prefix.as_str()),
                None => true,
            })
            .filter(|rule| !rule.title.is_empty() && seen.insert(rule.rule_id.as_str()))
            .map(|rule| RuleListing {
                rule_id: rule.rule_id.clone(),
                title: rule.title.clone(),
            })
            .collect();

        if listings.is_empty() {
            let reason = match part_filter {
                Some(letter) => format!("No rules found in PART {letter}."),
                None => "No rules found.".to_string(),
            };
            return QueryResult::not_found(reason);
        }

        // Ids without a number go last
        listings.sort_by_key(|listing| rule_number(&listing.rule_id).unwrap_or(u32::MAX));
        QueryResult::Found(listings)
    }
}
