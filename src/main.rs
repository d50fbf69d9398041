use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use datachat::{
    config::Config,
    dispatch,
    ingest::{IngestionGate, LocalFile},
    session::ConversationSession,
    utils::init_logger,
};

#[derive(Parser)]
#[command(name = "datachat", version, about = "Upload a dataset and chat about it")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal client (default)
    Tui {
        /// Dataset to load on startup
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the preview of a file as JSON
    Preview { file: PathBuf },
    /// Ask one question and print the transcript
    Ask {
        question: String,
        /// Dataset to load before asking
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let command = cli.command.unwrap_or(Command::Tui { file: None });

    // The TUI owns the terminal, so its logs go to a file
    let _guard = match command {
        Command::Tui { .. } => init_logger(Some(&config.logging.dir))?,
        _ => init_logger(None)?,
    };
    info!(backend_configured = config.backend.is_configured(), "Configuration loaded");

    match command {
        Command::Tui { file } => datachat::tui::run(config, file).await,
        Command::Preview { file } => print_preview(&config, &file).await,
        Command::Ask { question, file } => ask(&config, &question, file.as_deref()).await,
    }
}

async fn load(config: &Config, path: Option<&Path>) -> anyhow::Result<IngestionGate> {
    let gate = IngestionGate::new(config.preview.options());
    if let Some(path) = path {
        let file = LocalFile::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        gate.ingest(&file).await;
    }
    Ok(gate)
}

async fn print_preview(config: &Config, path: &Path) -> anyhow::Result<()> {
    let gate = load(config, Some(path)).await?;
    println!("{}", serde_json::to_string_pretty(&gate.current())?);
    Ok(())
}

async fn ask(config: &Config, question: &str, path: Option<&Path>) -> anyhow::Result<()> {
    let gate = load(config, path).await?;
    if let Some(notice) = gate.current().notice {
        eprintln!("{}", notice.text);
    }

    let backend_available = dispatch::resolve_availability(&config.backend).await;
    let dispatcher = dispatch::build_dispatcher(&config.backend, backend_available);
    let session = ConversationSession::new(dispatcher, gate.subscribe(), config.backend.timeout());

    session
        .send(question)
        .await
        .context("Question is empty")?;

    for message in session.state().transcript {
        println!("{}: {}", message.role, message.content);
    }
    Ok(())
}
