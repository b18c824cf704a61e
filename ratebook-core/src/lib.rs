// Ratebook Core Library
//
// Parses insurance rules manuals and rate-page exhibits into a corpus of
// rule chunks and tables, and answers lookups over that corpus.

pub mod types;
pub mod extract;
pub mod parsers;
pub mod corpus;
pub mod processor;
pub mod query;
pub mod render;
pub mod cache;
pub mod config;
pub mod classifier;
pub mod storage;
pub mod error;

// Re-export main types and functions for easy use
pub use types::*;
pub use extract::{PageExtractor, PdfPageExtractor};
pub use corpus::{CorpusBuilder, DocumentCorpus};
pub use processor::{BuildOptions, CorpusProcessor};
pub use query::{calculate, QueryEngine, QueryResult};
pub use render::{AgentText, RenderOptions};
pub use config::CorpusConfig;
pub use classifier::DocumentClassifier;
pub use error::{BuildError, ConfigError};

// Re-export backends for direct use
pub use extract::SidecarBackend;
#[cfg(feature = "lopdf-backend")]
pub use extract::LopdfBackend;
