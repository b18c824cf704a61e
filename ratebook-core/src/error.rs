use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to the caller of a corpus build.
///
/// Per-file extraction problems are not here: they are logged and the file is
/// skipped, so one broken PDF never costs the whole corpus.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("source folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("source folder could not be read: {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no parseable documents in {0}")]
    NoParseableDocuments(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid title normalization pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
