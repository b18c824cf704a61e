use crate::config::ClassifierConfig;
use crate::types::DocumentKind;

type ClassifyFn = dyn Fn(&str) -> DocumentKind + Send + Sync;

enum ClassificationRule {
    Markers(ClassifierConfig),
    Custom(Box<ClassifyFn>),
}

/// Routes a source file to the rules parser, the exhibit parser, or both.
pub struct DocumentClassifier {
    rule: ClassificationRule,
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl DocumentClassifier {
    /// Marker-based classification: a name containing a rules marker is
    /// rules-like, one containing a rate marker is rate-like, both is `Both`,
    /// neither falls back to `Rates`.
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            rule: ClassificationRule::Markers(config),
        }
    }

    /// Caller-supplied predicate, for corpora whose file names follow
    /// different conventions.
    pub fn with_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> DocumentKind + Send + Sync + 'static,
    {
        Self {
            rule: ClassificationRule::Custom(Box::new(predicate)),
        }
    }

    pub fn classify(&self, file_name: &str) -> DocumentKind {
        let kind = match &self.rule {
            ClassificationRule::Markers(config) => classify_by_markers(config, file_name),
            ClassificationRule::Custom(predicate) => predicate(file_name),
        };
        tracing::debug!("📋 {file_name} classified as {kind:?}");
        kind
    }
}

fn classify_by_markers(config: &ClassifierConfig, file_name: &str) -> DocumentKind {
    let contains_any = |markers: &[String]| {
        markers.iter().any(|marker| {
            if config.case_sensitive {
                file_name.contains(marker.as_str())
            } else {
                file_name.to_lowercase().contains(&marker.to_lowercase())
            }
        })
    };

    match (
        contains_any(&config.rules_markers),
        contains_any(&config.rate_markers),
    ) {
        (true, true) => DocumentKind::Both,
        (true, false) => DocumentKind::Rules,
        // Rate pages parser also handles anything unrecognised
        _ => DocumentKind::Rates,
    }
}
