//! Specification fact extractor.
//!
//! Parses structured markdown sections recognized by a fixed schema into
//! `SpecFact`s. Extraction is best-effort: malformed sections produce
//! `RunWarning::Parse` entries, never failures, and all successfully
//! parsed facts are always returned. Output ordering is stable by source
//! location, so identical corpus content yields bit-identical fact
//! sequences.

pub mod markdown;
pub mod tables;

use std::path::Path;

use specdrift_core::errors::ExtractError;
use specdrift_core::model::{RunWarning, SpecFact};
use xxhash_rust::xxh3::Xxh3;

/// A specification corpus: document paths paired with their content,
/// held in path order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<(String, String)>,
}

impl Corpus {
    /// Build a corpus from in-memory documents (sorted by path).
    pub fn from_documents(mut documents: Vec<(String, String)>) -> Self {
        documents.sort_by(|a, b| a.0.cmp(&b.0));
        Self { documents }
    }

    /// Read all matching documents under a directory, recursively.
    pub fn read_dir(root: &Path, extensions: &[String]) -> Result<Self, ExtractError> {
        if !root.is_dir() {
            return Err(ExtractError::CorpusNotFound {
                path: root.display().to_string(),
            });
        }
        let mut documents = Vec::new();
        collect_documents(root, root, extensions, &mut documents)?;
        if documents.is_empty() {
            return Err(ExtractError::EmptyCorpus {
                path: root.display().to_string(),
            });
        }
        Ok(Self::from_documents(documents))
    }

    pub fn documents(&self) -> &[(String, String)] {
        &self.documents
    }

    /// Content fingerprint of the whole corpus: xxh3 over document paths
    /// and contents in path order.
    pub fn revision(&self) -> String {
        let mut hasher = Xxh3::new();
        for (path, content) in &self.documents {
            hasher.update(path.as_bytes());
            hasher.update(b"\0");
            hasher.update(content.as_bytes());
            hasher.update(b"\0");
        }
        format!("{:016x}", hasher.digest())
    }
}

fn collect_documents(
    root: &Path,
    dir: &Path,
    extensions: &[String],
    out: &mut Vec<(String, String)>,
) -> Result<(), ExtractError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ExtractError::DocumentUnreadable {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| ExtractError::DocumentUnreadable {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_documents(root, &path, extensions, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x == e))
        {
            let content =
                std::fs::read_to_string(&path).map_err(|e| ExtractError::DocumentUnreadable {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            out.push((rel, content));
        }
    }
    Ok(())
}

/// Extract all spec facts from the corpus.
///
/// Returns the facts (sorted by source location) and any parse warnings.
/// Idempotent: re-extracting identical content yields identical output.
pub fn extract(corpus: &Corpus) -> (Vec<SpecFact>, Vec<RunWarning>) {
    let mut facts = Vec::new();
    let mut warnings = Vec::new();

    for (path, content) in corpus.documents() {
        markdown::extract_document(path, content, &mut facts, &mut warnings);
    }

    // Stable ordering by source location.
    facts.sort_by(|a, b| a.location.cmp(&b.location));
    (facts, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_is_content_addressed() {
        let a = Corpus::from_documents(vec![("a.md".into(), "# x".into())]);
        let b = Corpus::from_documents(vec![("a.md".into(), "# x".into())]);
        let c = Corpus::from_documents(vec![("a.md".into(), "# y".into())]);
        assert_eq!(a.revision(), b.revision());
        assert_ne!(a.revision(), c.revision());
    }

    #[test]
    fn document_order_is_normalized() {
        let a = Corpus::from_documents(vec![
            ("b.md".into(), "2".into()),
            ("a.md".into(), "1".into()),
        ]);
        let b = Corpus::from_documents(vec![
            ("a.md".into(), "1".into()),
            ("b.md".into(), "2".into()),
        ]);
        assert_eq!(a.revision(), b.revision());
    }
}
