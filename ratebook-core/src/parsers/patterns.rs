//! Line- and string-level heuristics used by the parsers.
//!
//! Every pattern is a named function so it can be tested against the literal
//! layouts found in rules manuals and rate pages.

use crate::config::TitleNormalization;
use crate::error::ConfigError;
use regex::{NoExpand, Regex, RegexBuilder};
use std::sync::LazyLock;

/// Exhibit name used when a page names no exhibit.
pub const UNKNOWN_EXHIBIT: &str = "Unknown";

// Pre-compiled regexes
static PART_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PART\s+([A-Z])\s*[-–—]\s*(.+?)$").unwrap());

static RULE_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Rule ([A-Z]-\d+):\s*(.+?)$").unwrap());

// Priority order: first match wins
static EXHIBIT_NAME_REGEXES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"Exhibit\s+(\d+[A-Za-z]?)").unwrap(),
        Regex::new(r"Exhibit\s+([IVX]+)").unwrap(),
        Regex::new(r"EXHIBIT\s+(\d+[A-Za-z]?)").unwrap(),
    ]
});

static RULE_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-(\d+)").unwrap());

static BRACKETED_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// Title artifacts from text of adjacent layout columns running into the title
static RUN_ON_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])[A-Z]{2,}[A-Z/].*$").unwrap());

static SLASH_CAPS_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[A-Z]{2,}.*$").unwrap());

static TRAILING_FACTORS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+FACTORS?$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartHeader {
    pub letter: char,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHeader {
    pub rule_id: String,
    pub raw_title: String,
}

/// Match a PART header such as `PART C – RATING PLAN`.
pub fn parse_part_header(line: &str) -> Option<PartHeader> {
    let caps = PART_HEADER_REGEX.captures(line)?;
    let letter = caps.get(1)?.as_str().chars().next()?;
    let name = caps.get(2)?.as_str().trim().to_string();
    Some(PartHeader { letter, name })
}

/// Match a rule header such as `Rule C-7: Hurricane Deductibles`.
pub fn parse_rule_header(line: &str) -> Option<RuleHeader> {
    let caps = RULE_HEADER_REGEX.captures(line)?;
    Some(RuleHeader {
        rule_id: caps.get(1)?.as_str().to_string(),
        raw_title: caps.get(2)?.as_str().to_string(),
    })
}

/// Find the exhibit a page belongs to, normalized to `Exhibit <id>`.
pub fn extract_exhibit_name(text: &str) -> Option<String> {
    EXHIBIT_NAME_REGEXES.iter().find_map(|regex| {
        regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|id| format!("Exhibit {}", id.as_str()))
    })
}

/// Like [`extract_exhibit_name`] but falls back to [`UNKNOWN_EXHIBIT`].
pub fn exhibit_name_or_unknown(text: &str) -> String {
    extract_exhibit_name(text).unwrap_or_else(|| UNKNOWN_EXHIBIT.to_string())
}

/// First integer after a hyphen in a rule id ("C-12" → 12).
pub fn rule_number(rule_id: &str) -> Option<u32> {
    RULE_NUMBER_REGEX
        .captures(rule_id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Strip `[...]` redline annotations, then collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let without_annotations = BRACKETED_REGEX.replace_all(text, "");
    WHITESPACE_REGEX
        .replace_all(&without_annotations, " ")
        .trim()
        .to_string()
}

/// Header comparison key: whitespace (including line breaks) collapsed,
/// trimmed and lower-cased.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_header(h)).collect()
}

/// Cleans rule titles: removes layout run-on artifacts, then applies the
/// configured normalization table.
#[derive(Debug, Clone, Default)]
pub struct TitleCleaner {
    normalizations: Vec<(Regex, String)>,
}

impl TitleCleaner {
    pub fn new(table: &[TitleNormalization]) -> Result<Self, ConfigError> {
        let normalizations = table
            .iter()
            .map(|entry| {
                RegexBuilder::new(&format!(r"\b(?:{})\b", entry.pattern))
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (regex, entry.replacement.clone()))
                    .map_err(|source| ConfigError::InvalidPattern {
                        pattern: entry.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { normalizations })
    }

    pub fn clean(&self, title: &str) -> String {
        let title = strip_title_artifacts(title);
        self.normalizations
            .iter()
            .fold(title, |title, (regex, replacement)| {
                regex
                    .replace_all(&title, NoExpand(replacement))
                    .into_owned()
            })
    }
}

/// Artifact removal without the normalization table.
pub fn strip_title_artifacts(title: &str) -> String {
    // "FactorSECONDARY RESIDENCE" → "Factor"
    let title = RUN_ON_SUFFIX_REGEX.replace(title, "$1");
    let title = SLASH_CAPS_SUFFIX_REGEX.replace(&title, "");
    let title = title.replace("/Water", "");
    let title = TRAILING_FACTORS_REGEX.replace(&title, "");
    title.trim().to_string()
}
