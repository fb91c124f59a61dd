//! Core domain types for planbot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The extracted study-plan corpus: document file name → extracted text.
///
/// Built once at startup and read-only afterwards. A `BTreeMap` keeps the
/// prompt-concatenation order deterministic across runs.
pub type Corpus = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// DocumentRecord
// ---------------------------------------------------------------------------

/// Metadata for a single successfully extracted document.
///
/// Not part of the corpus itself; used for startup logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// File name within the corpus directory.
    pub name: String,
    /// Number of characters of extracted text.
    pub chars: usize,
    /// SHA-256 hash of the extracted text.
    pub content_hash: String,
}

// ---------------------------------------------------------------------------
// DownloadRecord
// ---------------------------------------------------------------------------

/// Metadata for a downloaded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Source URL the file came from.
    pub url: String,
    /// Where the file was written.
    pub path: std::path::PathBuf,
    /// Size of the downloaded body in bytes.
    pub bytes: usize,
    /// When the download completed.
    pub downloaded_at: DateTime<Utc>,
}
