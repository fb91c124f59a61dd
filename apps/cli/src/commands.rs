//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncBufReadExt;
use tracing::{error, info};

use planbot_core::{AppContext, ChatTransport, DeliveryOptions, deliver, handle_message, pipeline};
use planbot_llm::GeminiClient;
use planbot_shared::{
    AppConfig, PlanbotError, init_config, load_config, resolve_gemini_api_key,
    validate_credentials,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// planbot — answer questions about master's programme study plans.
#[derive(Parser)]
#[command(
    name = "planbot",
    version,
    about = "Curriculum question-answering assistant backed by study-plan PDFs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load the corpus and answer questions read from stdin.
    Serve {
        /// Corpus directory (defaults to the configured one).
        #[arg(long)]
        corpus_dir: Option<String>,
    },

    /// Answer a single question and exit.
    Ask {
        /// The question to answer.
        question: String,

        /// Corpus directory (defaults to the configured one).
        #[arg(long)]
        corpus_dir: Option<String>,
    },

    /// Download the configured study-plan sources into the corpus directory.
    Fetch {
        /// Output directory (defaults to the configured corpus directory).
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "planbot=info",
        1 => "planbot=debug",
        _ => "planbot=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { corpus_dir } => cmd_serve(corpus_dir.as_deref()).await,
        Command::Ask {
            question,
            corpus_dir,
        } => cmd_ask(&question, corpus_dir.as_deref()).await,
        Command::Fetch { out } => cmd_fetch(out.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Context construction
// ---------------------------------------------------------------------------

/// Extract the corpus and assemble the request-handling context.
fn build_context(
    config: &AppConfig,
    corpus_dir: Option<&str>,
    gemini_api_key: String,
) -> Result<AppContext> {
    let dir = corpus_dir.unwrap_or(&config.corpus.dir);
    let (corpus, records) = planbot_extract::extract_corpus(Path::new(dir));

    for record in &records {
        info!(
            name = %record.name,
            chars = record.chars,
            hash = %record.content_hash,
            "document loaded"
        );
    }

    let llm = GeminiClient::new(&config.gemini.endpoint, &config.gemini.model)?;
    Ok(AppContext::new(corpus, gemini_api_key, llm))
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

/// Console transport: each fragment is printed as its own block.
struct ConsoleTransport;

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send(&self, text: &str) -> planbot_shared::Result<()> {
        println!("{text}");
        std::io::stdout()
            .flush()
            .map_err(|e| PlanbotError::Transport(e.to_string()))
    }
}

async fn cmd_serve(corpus_dir: Option<&str>) -> Result<()> {
    let config = load_config()?;

    // Both credentials are required before serving starts.
    let credentials = match validate_credentials(&config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "startup aborted");
            eprintln!("{e}");
            return Err(e.into());
        }
    };

    let ctx = build_context(&config, corpus_dir, credentials.gemini_api_key)?;

    info!(
        documents = ctx.corpus.len(),
        model = %config.gemini.model,
        "serving questions from stdin"
    );
    println!(
        "planbot ready: {} document(s) loaded. Type a question, Ctrl-D to exit.",
        ctx.corpus.len()
    );

    let transport = ConsoleTransport;
    let options = DeliveryOptions {
        pacing: Duration::from_millis(config.bot.pacing_ms),
    };

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let fragments = handle_message(&ctx, &line).await;
        if let Err(e) = deliver(&transport, &fragments, options).await {
            error!(error = %e, "delivery failed");
        }
    }

    info!("input closed, shutting down");
    Ok(())
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

async fn cmd_ask(question: &str, corpus_dir: Option<&str>) -> Result<()> {
    let config = load_config()?;

    let api_key = match resolve_gemini_api_key(&config) {
        Ok(k) => k,
        Err(e) => {
            error!(error = %e, "cannot answer without an API key");
            eprintln!("{e}");
            return Err(e.into());
        }
    };

    let ctx = build_context(&config, corpus_dir, api_key)?;
    let answer = pipeline::answer(&ctx, question).await;
    println!("{answer}");
    Ok(())
}

// ---------------------------------------------------------------------------
// fetch
// ---------------------------------------------------------------------------

async fn cmd_fetch(out: Option<&str>) -> Result<()> {
    let config = load_config()?;

    if config.sources.is_empty() {
        println!("No sources configured. Add [[sources]] entries to the config file.");
        return Ok(());
    }

    let out_dir = PathBuf::from(out.unwrap_or(&config.corpus.dir));
    let client = planbot_fetch::build_client()?;

    let bar = ProgressBar::new(config.sources.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut downloaded = 0usize;
    for source in &config.sources {
        bar.set_message(source.name.clone());
        match planbot_fetch::fetch_source(&client, source, &out_dir).await {
            Ok(record) => {
                downloaded += 1;
                info!(
                    name = %source.name,
                    path = %record.path.display(),
                    bytes = record.bytes,
                    "downloaded"
                );
            }
            Err(e) => {
                error!(name = %source.name, error = %e, "download failed, skipping");
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "Downloaded {downloaded}/{} source(s) into {}",
        config.sources.len(),
        out_dir.display()
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
