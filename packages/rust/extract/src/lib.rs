//! Study-plan text extraction.
//!
//! Scans a directory of downloaded PDFs at startup and builds the in-memory
//! corpus the answer pipeline feeds to the LLM. A missing directory or a
//! handful of unreadable files degrade the corpus, never the process.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use planbot_shared::{Corpus, DocumentRecord, PlanbotError, Result};

/// File extension recognized as a study-plan document.
const DOCUMENT_EXT: &str = ".pdf";

/// Extract text from every recognized document in `dir`.
///
/// Returns the corpus together with a [`DocumentRecord`] per extracted
/// file. A nonexistent directory yields an empty corpus with a warning;
/// per-file failures are logged and skipped so one corrupt PDF never
/// aborts the batch.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn extract_corpus(dir: &Path) -> (Corpus, Vec<DocumentRecord>) {
    let mut corpus = Corpus::new();
    let mut records = Vec::new();

    if !dir.exists() {
        warn!(dir = %dir.display(), "corpus directory not found, starting with an empty corpus");
        return (corpus, records);
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "corpus directory unreadable, starting with an empty corpus");
            return (corpus, records);
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.to_lowercase().ends_with(DOCUMENT_EXT) {
            continue;
        }

        match extract_file(&path) {
            Ok(text) => {
                let record = DocumentRecord {
                    name: name.to_string(),
                    chars: text.chars().count(),
                    content_hash: content_hash(&text),
                };
                debug!(
                    name = %record.name,
                    chars = record.chars,
                    hash = %record.content_hash,
                    "document extracted"
                );
                corpus.insert(name.to_string(), text);
                records.push(record);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "extraction failed, skipping file");
            }
        }
    }

    info!(documents = corpus.len(), "corpus loaded");
    (corpus, records)
}

/// Extract the full text of a single PDF.
///
/// Page texts are concatenated in page order with no separator between
/// pages (the downstream prompt treats the corpus as one opaque blob).
/// A document whose pages all come back empty counts as a failed
/// extraction.
pub fn extract_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| PlanbotError::io(path, e))?;

    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| PlanbotError::extraction(format!("{}: {e}", path.display())))?;

    let text: String = pages.concat();
    if text.is_empty() {
        return Err(PlanbotError::extraction(format!(
            "{}: no text layer found",
            path.display()
        )));
    }

    Ok(text)
}

/// SHA-256 hash of extracted text, for logging and change detection.
fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "planbot-extract-{tag}-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn nonexistent_directory_yields_empty_corpus() {
        let dir = std::env::temp_dir().join(format!("planbot-missing-{}", uuid::Uuid::now_v7()));
        let (corpus, records) = extract_corpus(&dir);
        assert!(corpus.is_empty());
        assert!(records.is_empty());
    }

    #[test]
    fn corrupt_pdf_is_skipped() {
        let dir = temp_dir("corrupt");
        std::fs::write(dir.join("broken.pdf"), b"definitely not a pdf").expect("write");

        let (corpus, records) = extract_corpus(&dir);
        assert!(corpus.is_empty());
        assert!(records.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_pdf_files_are_ignored() {
        let dir = temp_dir("mixed");
        std::fs::write(dir.join("notes.txt"), b"plain text").expect("write");
        std::fs::write(dir.join("plan.docx"), b"word doc").expect("write");

        let (corpus, _) = extract_corpus(&dir);
        assert!(corpus.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn extract_file_missing_path_is_an_io_error() {
        let path = std::env::temp_dir().join(format!("planbot-gone-{}.pdf", uuid::Uuid::now_v7()));
        let err = extract_file(&path).unwrap_err();
        assert!(matches!(err, PlanbotError::Io { .. }));
    }

    #[test]
    fn content_hash_is_stable_hex() {
        let hash = content_hash("hello world");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
