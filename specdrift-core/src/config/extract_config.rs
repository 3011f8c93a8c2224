//! Specification extraction configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the specification fact extractor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractConfig {
    /// Root directory of the specification corpus. Default: "spec".
    pub corpus_dir: Option<String>,
    /// Document extensions recognized as corpus members. Default: ["md"].
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl ExtractConfig {
    /// Returns the effective corpus directory, defaulting to `spec`.
    pub fn effective_corpus_dir(&self) -> &str {
        self.corpus_dir.as_deref().unwrap_or("spec")
    }

    /// Returns the effective extensions, defaulting to markdown only.
    pub fn effective_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            vec!["md".to_string()]
        } else {
            self.extensions.clone()
        }
    }
}
