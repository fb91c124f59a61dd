//! Shared types, error model, and configuration for planbot.
//!
//! This crate is the foundation depended on by all other planbot crates.
//! It provides:
//! - [`PlanbotError`] — the unified error type
//! - Domain types ([`Corpus`], [`DocumentRecord`], [`DownloadRecord`])
//! - Configuration ([`AppConfig`], credential resolution, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BotConfig, CorpusConfig, Credentials, GeminiConfig, SourceEntry, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_gemini_api_key,
    validate_credentials,
};
pub use error::{PlanbotError, Result};
pub use types::{Corpus, DocumentRecord, DownloadRecord};
