use crate::corpus::DocumentCorpus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version constants for cache invalidation
pub mod versions {
    pub const RATEBOOK_VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Bump whenever parser output changes for the same input
    pub const PARSER_VERSION: &str = "1.0.0";
}

/// Cache key for a parsed folder (source files + parsing config → corpus)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorpusCacheKey {
    pub folder_name: String,
    pub folder_fingerprint: String,
    pub config_hash: String,
    pub ratebook_version: String,
    pub parser_version: String,
}

impl CorpusCacheKey {
    pub fn new(folder_name: String, folder_fingerprint: String, config_hash: String) -> Self {
        Self {
            folder_name,
            folder_fingerprint,
            config_hash,
            ratebook_version: versions::RATEBOOK_VERSION.to_string(),
            parser_version: versions::PARSER_VERSION.to_string(),
        }
    }

    /// Compute cache key hash for storage
    pub fn to_cache_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.folder_name);
        hasher.update(&self.folder_fingerprint);
        hasher.update(&self.config_hash);
        hasher.update(&self.ratebook_version);
        hasher.update(&self.parser_version);
        format!("{:x}", hasher.finalize())
    }

    /// Cache entry name: readable folder name plus a short hash
    pub fn entry_name(&self) -> String {
        let hash = self.to_cache_hash();
        let folder: String = self
            .folder_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{folder}_{}", &hash[..16])
    }
}

/// Cached corpus with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    pub corpus: DocumentCorpus,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub cache_version: String,
}

impl CorpusSnapshot {
    pub fn new(corpus: DocumentCorpus, processing_time_ms: u64) -> Self {
        Self {
            corpus,
            created_at: Utc::now(),
            processing_time_ms,
            cache_version: versions::RATEBOOK_VERSION.to_string(),
        }
    }
}
