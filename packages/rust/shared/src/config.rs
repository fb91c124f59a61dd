//! Application configuration for planbot.
//!
//! User config lives at `~/.planbot/planbot.toml`.
//! Credentials are never stored in the file; the config only names the
//! environment variables they are read from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlanbotError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "planbot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".planbot";

// ---------------------------------------------------------------------------
// Config structs (matching planbot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Corpus directory settings.
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Chat transport settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Registered study-plan source URLs.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// `[corpus]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory scanned for study-plan PDFs at startup.
    #[serde(default = "default_corpus_dir")]
    pub dir: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: default_corpus_dir(),
        }
    }
}

fn default_corpus_dir() -> String {
    "study_plans".into()
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model ID used for `generateContent`.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL. Overridable for tests against a local mock server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".into()
}

/// `[bot]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Name of the env var holding the chat transport token.
    #[serde(default = "default_bot_token_env")]
    pub token_env: String,

    /// Delay in ms between fragments of a long answer.
    #[serde(default = "default_pacing")]
    pub pacing_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token_env: default_bot_token_env(),
            pacing_ms: default_pacing(),
        }
    }
}

fn default_bot_token_env() -> String {
    "BOT_TOKEN".into()
}
fn default_pacing() -> u64 {
    500
}

/// `[[sources]]` entry — a registered study-plan download URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Human-readable name of the programme.
    pub name: String,
    /// Direct URL of the study-plan PDF.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Credentials resolved from the environment at startup.
///
/// Invariant: both values are non-empty once constructed.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Chat transport token.
    pub bot_token: String,
    /// Gemini API key.
    pub gemini_api_key: String,
}

/// Resolve both credentials from the env vars named in `config`.
///
/// Serving must not start without them, so a missing or empty variable is a
/// hard error carrying a fixed operator-facing diagnostic.
pub fn validate_credentials(config: &AppConfig) -> Result<Credentials> {
    let bot_token = require_env(&config.bot.token_env)?;
    let gemini_api_key = require_env(&config.gemini.api_key_env)?;
    Ok(Credentials {
        bot_token,
        gemini_api_key,
    })
}

/// Resolve just the Gemini API key, for one-shot commands that never talk
/// to a chat transport.
pub fn resolve_gemini_api_key(config: &AppConfig) -> Result<String> {
    require_env(&config.gemini.api_key_env)
}

/// Read a required, non-empty environment variable.
fn require_env(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PlanbotError::config(format!(
            "required credential not found. Set the {var_name} environment variable."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.planbot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PlanbotError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.planbot/planbot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PlanbotError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PlanbotError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PlanbotError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PlanbotError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PlanbotError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
