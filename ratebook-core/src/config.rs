use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

// Default value functions for serde
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Filename classification - which parser(s) a file is routed to
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Known rule-title spellings mapped to their canonical form
    #[serde(default = "default_title_normalizations")]
    pub title_normalizations: Vec<TitleNormalization>,
    /// Cross-page exhibit merging
    #[serde(default)]
    pub merge: MergeConfig,
    /// Keyword scoring weights for the query engine
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Result sizes and preview lengths
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            title_normalizations: default_title_normalizations(),
            merge: MergeConfig::default(),
            scoring: ScoringConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Substrings of a file name that mark a rules manual
    #[serde(default = "default_rules_markers")]
    pub rules_markers: Vec<String>,
    /// Substrings of a file name that mark rate pages
    #[serde(default = "default_rate_markers")]
    pub rate_markers: Vec<String>,
    /// Match markers case-sensitively ("Rules" but not "rules")
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

fn default_rules_markers() -> Vec<String> {
    vec!["Rules".to_string(), "Manual".to_string()]
}

fn default_rate_markers() -> Vec<String> {
    vec!["Rate".to_string(), "Pages".to_string()]
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules_markers: default_rules_markers(),
            rate_markers: default_rate_markers(),
            case_sensitive: true,
        }
    }
}

/// One entry of the title normalization table.
///
/// `pattern` is a regex matched whole-word and case-insensitively; the whole
/// match is replaced by `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleNormalization {
    pub pattern: String,
    pub replacement: String,
}

impl TitleNormalization {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

// Optional trailing "Factor(s)" keeps each entry idempotent under
// case-insensitive matching.
fn default_title_normalizations() -> Vec<TitleNormalization> {
    vec![
        TitleNormalization::new(r"BASE RATES", "Base Rates"),
        TitleNormalization::new(r"AGE OF HOME(?:\s+FACTORS?)?", "Age of Home Factor"),
        TitleNormalization::new(
            r"PUBLIC PROTECTION CLASS(?:\s+FACTORS?)?",
            "Public Protection Class Factors",
        ),
        TitleNormalization::new(
            r"POLICY TERRITORY DETERMINATION",
            "Policy Territory Determination",
        ),
        TitleNormalization::new(r"UNDERWRITING EXPERIENCE(?:\s+FACTORS?)?", "Underwriting Experience"),
        TitleNormalization::new(r"MINIMUM PREMIUM", "Minimum Premium"),
        TitleNormalization::new(r"SWIMMING POOLS?(?:\s+FACTORS?)?", "Pool Factor"),
        TitleNormalization::new(
            r"AMOUNT OF INSURANCE\s*/\s*DEDUCTIBLES?",
            "Amount of Insurance / Deductibles",
        ),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Whether page fragments of one exhibit are merged at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Largest page distance between consecutive fragments of one exhibit
    /// (2 tolerates one skipped page, e.g. a full-page chart)
    #[serde(default = "default_page_tolerance")]
    pub page_tolerance: u32,
}

fn default_page_tolerance() -> u32 {
    2
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_tolerance: default_page_tolerance(),
        }
    }
}

/// Heuristic weights for keyword scoring. Not derived from any model;
/// tune per corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Query found inside the rule title
    #[serde(default = "default_title_match_weight")]
    pub title_match_weight: u32,
    /// Query found inside the rule id
    #[serde(default = "default_rule_id_match_weight")]
    pub rule_id_match_weight: u32,
    /// Per non-overlapping occurrence in rule content
    #[serde(default = "default_content_occurrence_weight")]
    pub content_occurrence_weight: u32,
    /// Whole description found inside a PART name
    #[serde(default = "default_part_phrase_weight")]
    pub part_phrase_weight: u32,
    /// Per description word found inside a PART name
    #[serde(default = "default_part_word_weight")]
    pub part_word_weight: u32,
    /// Words shorter than this are ignored for PART word matching
    #[serde(default = "default_part_word_min_len")]
    pub part_word_min_len: usize,
}

fn default_title_match_weight() -> u32 {
    10
}

fn default_rule_id_match_weight() -> u32 {
    5
}

fn default_content_occurrence_weight() -> u32 {
    1
}

fn default_part_phrase_weight() -> u32 {
    100
}

fn default_part_word_weight() -> u32 {
    10
}

fn default_part_word_min_len() -> usize {
    3 // "longer than 2 characters"
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title_match_weight: default_title_match_weight(),
            rule_id_match_weight: default_rule_id_match_weight(),
            content_occurrence_weight: default_content_occurrence_weight(),
            part_phrase_weight: default_part_phrase_weight(),
            part_word_weight: default_part_word_weight(),
            part_word_min_len: default_part_word_min_len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_rules_top_k")]
    pub rules_top_k: usize,
    #[serde(default = "default_exhibits_top_k")]
    pub exhibits_top_k: usize,
    /// Runner-up PARTs reported next to the best match
    #[serde(default = "default_part_alternatives")]
    pub part_alternatives: usize,
    /// Rows shown when a table is extracted without a description
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
    /// Rows shown when a table is extracted with a description
    #[serde(default = "default_matching_rows")]
    pub matching_rows: usize,
    /// Characters of rule content shown in rendered results
    #[serde(default = "default_content_preview_chars")]
    pub content_preview_chars: usize,
}

fn default_rules_top_k() -> usize {
    5
}

fn default_exhibits_top_k() -> usize {
    3
}

fn default_part_alternatives() -> usize {
    3
}

fn default_sample_rows() -> usize {
    5
}

fn default_matching_rows() -> usize {
    10
}

fn default_content_preview_chars() -> usize {
    500
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rules_top_k: default_rules_top_k(),
            exhibits_top_k: default_exhibits_top_k(),
            part_alternatives: default_part_alternatives(),
            sample_rows: default_sample_rows(),
            matching_rows: default_matching_rows(),
            content_preview_chars: default_content_preview_chars(),
        }
    }
}

impl CorpusConfig {
    /// Load config from file path
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("⚠️  Failed to load config from {p} ({e}), using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// The subset of settings that changes parse output. Query-side settings
    /// are excluded so tuning them never invalidates cached snapshots.
    pub fn parsing_fingerprint(&self) -> ParsingSettings<'_> {
        ParsingSettings {
            classifier: &self.classifier,
            title_normalizations: &self.title_normalizations,
            merge: &self.merge,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParsingSettings<'a> {
    pub classifier: &'a ClassifierConfig,
    pub title_normalizations: &'a [TitleNormalization],
    pub merge: &'a MergeConfig,
}
