//! reposcore - LLM-backed repository quality evaluation
//!
//! Entry point for the CLI and the HTTP API server.

use clap::{Parser, Subcommand};
use reposcore_core::config::Settings;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "reposcore")]
#[command(about = "Score repository quality with an LLM and keep the history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database path (overrides configuration and REPOSCORE_DATABASE_PATH)
    #[arg(long)]
    db_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Listen address (defaults to server.addr)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Send content to the model and print its raw answer
    Complete {
        /// Content to send
        #[arg(short, long)]
        content: Option<String>,

        /// Read content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Instruction for the model
        #[arg(short, long)]
        prompt: String,
    },

    /// Register a repository by URL and print its id
    Register {
        /// Repository URL
        html_url: String,
    },

    /// Evaluate a registered repository and store the result
    Evaluate {
        /// Repository id
        id: i64,

        /// Extracted repository content
        #[arg(short, long)]
        content: Option<String>,

        /// Read content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Instruction override (blank or omitted uses the built-in evaluation prompt)
        #[arg(short, long)]
        prompt: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List stored analyses for a repository, newest first
    History {
        /// Repository id
        id: i64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print one stored analysis
    Show {
        /// Analysis id
        id: i64,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: cli::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Library and binary share the reposcore prefix; keep HTTP internals quiet
    let filter = EnvFilter::new(format!(
        "reposcore={level},reposcore_core={level},tower_http={level},hyper=warn,reqwest=warn",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("reposcore v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db_path {
        settings.database_path = db_path;
    }

    match cli.command {
        Commands::Serve { addr } => cli::serve::handle(settings, addr).await,
        Commands::Complete {
            content,
            file,
            prompt,
        } => Ok(cli::complete::handle(settings, content, file, prompt).await?),
        Commands::Register { html_url } => Ok(cli::register::handle(settings, html_url).await?),
        Commands::Evaluate {
            id,
            content,
            file,
            prompt,
            format,
        } => Ok(cli::evaluate::handle(settings, id, content, file, prompt, format).await?),
        Commands::History { id, format } => Ok(cli::history::handle(settings, id, format).await?),
        Commands::Show { id } => Ok(cli::history::show(settings, id).await?),
        Commands::Config { action } => cli::config::handle(action, &settings),
    }
}
