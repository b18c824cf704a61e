use crate::cache::{CorpusCacheKey, CorpusSnapshot};
use crate::extract::{is_pdf, backends::sidecar::SIDECAR_EXTENSION};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Storage abstraction for caching parsed corpora
pub trait CorpusStorage {
    fn get_corpus(&self, cache_key: &CorpusCacheKey) -> Result<Option<CorpusSnapshot>>;
    fn store_corpus(&self, cache_key: &CorpusCacheKey, snapshot: &CorpusSnapshot) -> Result<()>;

    /// Remove every cached corpus, returning how many were removed
    fn clear(&self) -> Result<usize>;

    fn entries(&self) -> Result<Vec<CacheEntry>>;
}

/// One cached corpus as seen on disk.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub name: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// File-based storage implementation using local cache directory
pub struct FileStorage {
    cache_dir: PathBuf,
}

impl FileStorage {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        // Ensure cache directory exists
        fs::create_dir_all(cache_dir.join("corpus"))?;

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn corpus_dir(&self) -> PathBuf {
        self.cache_dir.join("corpus")
    }

    fn corpus_path(&self, cache_key: &CorpusCacheKey) -> PathBuf {
        self.corpus_dir().join(format!("{}.json", cache_key.entry_name()))
    }

    fn cached_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(self.corpus_dir())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl CorpusStorage for FileStorage {
    fn get_corpus(&self, cache_key: &CorpusCacheKey) -> Result<Option<CorpusSnapshot>> {
        let path = self.corpus_path(cache_key);
        if path.exists() {
            let json_str = fs::read_to_string(path)?;
            let snapshot: CorpusSnapshot = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached CorpusSnapshot: {}", e))?;
            Ok(Some(snapshot))
        } else {
            Ok(None)
        }
    }

    fn store_corpus(&self, cache_key: &CorpusCacheKey, snapshot: &CorpusSnapshot) -> Result<()> {
        let path = self.corpus_path(cache_key);
        let json_str = serde_json::to_string(snapshot)
            .map_err(|e| anyhow!("Failed to serialize CorpusSnapshot: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }

    fn clear(&self) -> Result<usize> {
        let files = self.cached_files()?;
        for file in &files {
            fs::remove_file(file)?;
        }
        Ok(files.len())
    }

    fn entries(&self) -> Result<Vec<CacheEntry>> {
        self.cached_files()?
            .into_iter()
            .map(|path| {
                let metadata = fs::metadata(&path)?;
                Ok(CacheEntry {
                    name: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    size_bytes: metadata.len(),
                    modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                })
            })
            .collect()
    }
}

/// Fingerprint of a folder's source files.
///
/// Covers every PDF and page dump: name, modification time and size. Editing,
/// adding, removing or touching any of them changes the fingerprint; other
/// files in the folder are ignored.
pub fn calculate_folder_fingerprint(folder: &Path) -> Result<String> {
    let mut signatures = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !(is_pdf(&path) || name.ends_with(SIDECAR_EXTENSION)) {
            continue;
        }

        let metadata = entry.metadata()?;
        let mtime = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        signatures.push(format!("{name}:{mtime}:{}", metadata.len()));
    }
    signatures.sort();

    let mut hasher = Sha256::new();
    hasher.update(signatures.join("|").as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Calculate hash for configuration data (for the cache key)
pub fn calculate_config_hash<T: Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// No-op storage implementation that disables all caching
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl CorpusStorage for NoOpStorage {
    fn get_corpus(&self, _cache_key: &CorpusCacheKey) -> Result<Option<CorpusSnapshot>> {
        Ok(None) // Always cache miss
    }

    fn store_corpus(&self, _cache_key: &CorpusCacheKey, _snapshot: &CorpusSnapshot) -> Result<()> {
        Ok(()) // No-op
    }

    fn clear(&self) -> Result<usize> {
        Ok(0)
    }

    fn entries(&self) -> Result<Vec<CacheEntry>> {
        Ok(Vec::new())
    }
}
