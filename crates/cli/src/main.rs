//! OmniDesk CLI - help desk tickets from the terminal

mod commands;
mod config;
mod logging;
mod render;
mod state_dir;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use omnidesk_http::{FileTokenStore, OmnideskClient};
use render::Output;
use state_dir::StateDir;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug};

#[derive(Parser)]
#[command(name = "omnidesk")]
#[command(about = "Command line client for the OmniDesk help desk")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Base URL of the OmniDesk API, e.g. http://localhost:5000/api
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Configuration file (defaults to omnidesk.toml in the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for configuration, session and logs
    #[arg(long, global = true, env = "OMNIDESK_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Request timeout in seconds (0 = no timeout)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let state = StateDir::resolve(cli.state_dir);
    let log_file = (!cli.no_file_log).then(|| state.log_path());
    logging::init_logging(cli.log_level.into(), log_file.as_deref())?;
    state.create_directories()?;

    let mut settings = config::Settings::load(cli.config.as_deref(), &state.config_path())?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout_secs = timeout;
    }
    debug!(api_url = %settings.api_url, timeout_secs = settings.timeout_secs, "Loaded settings");

    let tokens = Arc::new(FileTokenStore::open(state.session_path())?);
    let mut builder = OmnideskClient::builder()
        .base_url(&settings.api_url)
        .token_store(tokens);
    if let Some(timeout) = settings.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(agent) = &settings.user_agent {
        builder = builder.user_agent(agent);
    }

    let ctx = Context {
        client: builder.build()?,
        output: Output::new(cli.json),
    };

    match cli.command.execute(&ctx).await {
        Ok(()) => {
            debug!("Command completed successfully");
        }
        Err(e) => {
            debug!("Command failed: {e:#}");
            eprintln!("{}", render::error_message(&e));
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
