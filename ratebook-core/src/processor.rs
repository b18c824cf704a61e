use crate::cache::{CorpusCacheKey, CorpusSnapshot};
use crate::classifier::DocumentClassifier;
use crate::config::CorpusConfig;
use crate::corpus::{CorpusBuilder, DocumentCorpus};
use crate::error::BuildError;
use crate::extract::{is_pdf, PageExtractor, PdfPageExtractor};
use crate::storage::{
    calculate_config_hash, calculate_folder_fingerprint, CorpusStorage, FileStorage, NoOpStorage,
};
use crate::types::DocumentInput;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        tracing::info!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        tracing::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            tracing::info!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        tracing::info!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// Switches for one corpus build
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Ignore any cached corpus and do not store the result
    pub skip_cache: bool,
    /// Log per-step timings
    pub profile: bool,
}

/// Builds a [`DocumentCorpus`] from a folder: lists source files, extracts
/// pages, parses, and caches the result keyed on folder contents + config.
pub struct CorpusProcessor {
    extractor: Box<dyn PageExtractor>,
    storage: Box<dyn CorpusStorage + Send + Sync>,
    classifier: DocumentClassifier,
}

impl CorpusProcessor {
    /// Create CorpusProcessor with full dependency injection
    pub fn new_with_dependencies(
        extractor: Box<dyn PageExtractor>,
        storage: Box<dyn CorpusStorage + Send + Sync>,
        classifier: DocumentClassifier,
    ) -> Self {
        Self {
            extractor,
            storage,
            classifier,
        }
    }

    /// Convenience constructor for CLI usage: default extractor, marker-based
    /// classification, file cache unless `cache_dir` is `None`.
    pub fn new_cli(config: &CorpusConfig, cache_dir: Option<&Path>) -> Result<Self> {
        let storage: Box<dyn CorpusStorage + Send + Sync> = match cache_dir {
            Some(dir) => Box::new(FileStorage::new(dir)?),
            None => Box::new(NoOpStorage::new()),
        };
        Ok(Self::new_with_dependencies(
            Box::new(PdfPageExtractor::new()),
            storage,
            DocumentClassifier::new(config.classifier.clone()),
        ))
    }

    pub fn storage(&self) -> &(dyn CorpusStorage + Send + Sync) {
        self.storage.as_ref()
    }

    /// Parse every PDF in `folder` into one corpus.
    ///
    /// A file that fails extraction is logged and skipped. The build fails
    /// only when the folder is missing or unreadable, or when no file at all
    /// could be extracted.
    pub fn build_from_folder(
        &self,
        folder: &Path,
        config: &CorpusConfig,
        options: BuildOptions,
    ) -> Result<DocumentCorpus, BuildError> {
        let start_time = Instant::now();
        let mut profiler = StepProfiler::new(options.profile);

        let pdf_files = profiler.time_step("List Source Files", || list_pdf_files(folder))?;
        if pdf_files.is_empty() {
            return Err(BuildError::NoParseableDocuments(folder.to_path_buf()));
        }

        // Cache trouble never fails a build
        let cache_key = if options.skip_cache {
            tracing::info!("🚫 Skipping cache lookup (--skip-cache enabled)");
            None
        } else {
            profiler.time_step("Cache Key Generation", || match cache_key_for(folder, config) {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!("⚠️  Could not fingerprint {}: {e}", folder.display());
                    None
                }
            })
        };

        if let Some(key) = &cache_key {
            let cached = profiler.time_step("Cache Lookup", || self.storage.get_corpus(key));
            match cached {
                Ok(Some(snapshot)) => {
                    tracing::info!(
                        "🎯 Cache hit: corpus for {} built {}",
                        folder.display(),
                        snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                    profiler.log_summary();
                    return Ok(snapshot.corpus);
                }
                Ok(None) => tracing::debug!("Cache miss for {}", key.entry_name()),
                Err(e) => tracing::warn!("⚠️  Ignoring unreadable cache entry: {e}"),
            }
        }

        tracing::info!(
            "📂 Processing {} documents in {}",
            pdf_files.len(),
            folder.display()
        );

        let mut builder = CorpusBuilder::new(config, &self.classifier)?;
        for path in &pdf_files {
            let name = file_name(path);
            let pages = profiler.time_step(&format!("Extract {name}"), || self.extractor.extract(path));
            match pages {
                Ok(pages) => {
                    profiler.time_step(&format!("Parse {name}"), || {
                        builder.add_document(DocumentInput::new(name.clone(), pages))
                    });
                }
                Err(e) => tracing::warn!("⚠️  Skipping {name}: {e:#}"),
            }
        }

        if builder.document_count() == 0 {
            return Err(BuildError::NoParseableDocuments(folder.to_path_buf()));
        }
        let corpus = builder.finish();

        if let Some(key) = &cache_key {
            profiler.time_step("Cache Storage", || {
                let processing_time = start_time.elapsed().as_millis() as u64;
                let snapshot = CorpusSnapshot::new(corpus.clone(), processing_time);
                if let Err(e) = self.storage.store_corpus(key, &snapshot) {
                    tracing::warn!("⚠️  Failed to cache corpus: {e}");
                }
            });
        }

        profiler.log_summary();
        tracing::info!(
            "✅ Corpus ready: {} rules, {} exhibits from {} documents in {:.3}s",
            corpus.rules().len(),
            corpus.exhibits().len(),
            corpus.documents().len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(corpus)
    }
}

fn cache_key_for(folder: &Path, config: &CorpusConfig) -> Result<CorpusCacheKey> {
    let fingerprint = calculate_folder_fingerprint(folder)?;
    let config_hash = calculate_config_hash(&config.parsing_fingerprint())?;
    let folder_name = folder
        .canonicalize()
        .unwrap_or_else(|_| folder.to_path_buf())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string());
    Ok(CorpusCacheKey::new(folder_name, fingerprint, config_hash))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// PDF files directly inside `folder`, sorted by file name.
pub fn list_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let unreadable = |source| BuildError::Unreadable {
        path: folder.to_path_buf(),
        source,
    };

    match fs::metadata(folder) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(BuildError::FolderNotFound(folder.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BuildError::FolderNotFound(folder.to_path_buf()))
        }
        Err(e) => return Err(unreadable(e)),
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() && is_pdf(&path) {
            files.push(path);
        }
    }
    files.sort_by_key(|p| file_name(p));
    Ok(files)
}
