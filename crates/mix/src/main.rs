//! Mix - walkthroughs of the Mix agent server API
//!
//! Main entry point for the Mix CLI.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{
    auth, basic, files, messages, permissions, preferences, sessions, stream, system, tools,
};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Mix - walkthroughs of the Mix agent server API
#[derive(Parser)]
#[command(name = "mix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: http://localhost:8088)
    #[arg(long, global = true, env = "MIX_SERVER_URL")]
    pub server: Option<String>,

    /// Named context from the client config file
    #[arg(long, global = true)]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Health check and a basic session round trip
    Basic(basic::BasicArgs),

    /// Session lifecycle: fork, callbacks, export, rewind
    Sessions(sessions::SessionsArgs),

    /// Conversation history and message metadata
    Messages(messages::MessagesArgs),

    /// Upload, list, download and delete session files
    Files(files::FilesArgs),

    /// Provider credentials and OAuth
    Auth(auth::AuthArgs),

    /// Model preferences
    Preferences(preferences::PreferencesArgs),

    /// Watch for and answer permission requests
    Permissions(permissions::PermissionsArgs),

    /// Server health, commands and MCP servers
    System(system::SystemArgs),

    /// LLM tools and their credentials
    Tools(tools::ToolsArgs),

    /// Stream a session's events while sending a message
    Stream(stream::StreamArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "mix=debug,mix_client=debug,mix_config=debug,info"
    } else {
        "mix=info,warn"
    };

    let log_dir = mix_config::log_dir();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "mix.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "mix=trace,mix_client=trace,mix_config=trace,info",
                )),
        )
        .init();

    let config = mix_config::load_client_config().context("Failed to load client config")?;

    let ctx = commands::Context::resolve(
        &config,
        cli.server,
        cli.context.as_deref(),
        cli.json,
        cli.verbose,
    )?;

    tracing::debug!(server = %ctx.server_url, "Resolved server");

    // Dispatch to command handlers
    match cli.command {
        Commands::Basic(args) => basic::run(args, &ctx).await,
        Commands::Sessions(args) => sessions::run(args, &ctx).await,
        Commands::Messages(args) => messages::run(args, &ctx).await,
        Commands::Files(args) => files::run(args, &ctx).await,
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Preferences(args) => preferences::run(args, &ctx).await,
        Commands::Permissions(args) => permissions::run(args, &ctx).await,
        Commands::System(args) => system::run(args, &ctx).await,
        Commands::Tools(args) => tools::run(args, &ctx).await,
        Commands::Stream(args) => stream::run(args, &ctx).await,
    }
}
