//! planbot CLI — curriculum question-answering assistant.
//!
//! Downloads study-plan PDFs, extracts them into a text corpus, and answers
//! applicant questions about the programmes through the Gemini API.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
