//! Read-only lookups over a [`DocumentCorpus`].
//!
//! Every operation returns a [`QueryResult`] so callers can tell an empty
//! corpus, a miss and a missing column apart without parsing messages.

pub mod calculate;
pub mod exhibits;
pub mod rules;

use crate::config::{CorpusConfig, LimitsConfig, ScoringConfig};
use crate::corpus::DocumentCorpus;
use serde::Serialize;

pub use calculate::{calculate, CalcError, Calculation};
pub use exhibits::{
    ExhibitHit, ExhibitSummary, MatchedValue, RowSelection, TableView, ValueMatch,
};
pub use rules::{PartInfo, PartMatch, RuleHit, RuleListing, ScoredPart};

/// Outcome of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum QueryResult<T> {
    Found(T),
    /// The corpus holds nothing of the kind being asked about
    NoData,
    NotFound { reason: String },
    /// A criterion or return column names no header of the exhibit
    ColumnNotFound { column: String, exhibit: String },
}

impl<T> QueryResult<T> {
    pub fn not_found(reason: impl Into<String>) -> Self {
        QueryResult::NotFound {
            reason: reason.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, QueryResult::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            QueryResult::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            QueryResult::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryResult<U> {
        match self {
            QueryResult::Found(value) => QueryResult::Found(f(value)),
            QueryResult::NoData => QueryResult::NoData,
            QueryResult::NotFound { reason } => QueryResult::NotFound { reason },
            QueryResult::ColumnNotFound { column, exhibit } => {
                QueryResult::ColumnNotFound { column, exhibit }
            }
        }
    }
}

/// Query engine borrowing a built corpus.
pub struct QueryEngine<'a> {
    corpus: &'a DocumentCorpus,
    scoring: ScoringConfig,
    limits: LimitsConfig,
}

impl<'a> QueryEngine<'a> {
    pub fn new(corpus: &'a DocumentCorpus, config: &CorpusConfig) -> Self {
        Self {
            corpus,
            scoring: config.scoring.clone(),
            limits: config.limits.clone(),
        }
    }

    pub fn with_defaults(corpus: &'a DocumentCorpus) -> Self {
        Self::new(corpus, &CorpusConfig::default())
    }

    pub fn corpus(&self) -> &'a DocumentCorpus {
        self.corpus
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }
}

/// Case-insensitive substring test; `needle` must already be lower-cased.
pub(crate) fn contains_lower(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// `None` filter matches every document.
pub(crate) fn document_matches(source_document: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(filter) => contains_lower(source_document, &filter.to_lowercase()),
        None => true,
    }
}
