mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    auth::AuthCommand, batch::BatchSubcommand, config::ConfigSubcommand, purge::PurgeSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "review",
    about = "Asset review console: decide, batch-move, and purge DAM assets",
    version,
    propagate_version = true
)]
struct Cli {
    /// Console root (default: auto-detect from .review/)
    #[arg(long, global = true, env = "REVIEW_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Override the configured backend base URL
    #[arg(long, global = true, env = "REVIEW_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the review console in the current directory
    Init {
        /// Review assets held only in this console (no backend decisions)
        #[arg(long)]
        local: bool,
        /// Locale for status messages
        #[arg(long)]
        locale: Option<String>,
    },

    /// Start the review dashboard
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3151")]
        port: u16,
        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },

    /// List assets awaiting review
    Assets,

    /// Mark assets as kept or rejected
    Decide {
        /// keep or reject
        action: String,
        /// Asset ids
        #[arg(required = true)]
        asset_ids: Vec<String>,
    },

    /// Preview, execute, and report on move batches
    Batch {
        #[command(subcommand)]
        subcommand: BatchSubcommand,
    },

    /// Permanently delete single assets
    Purge {
        #[command(subcommand)]
        subcommand: PurgeSubcommand,
    },

    /// Inspect and validate the console config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    #[command(flatten)]
    Auth(AuthCommand),
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let api_url = cli.api_url.as_deref();

    let result = match cli.command {
        Commands::Init { local, locale } => {
            cmd::init::run(&root, api_url, local, locale.as_deref())
        }
        Commands::Serve { port, no_open } => cmd::serve::run(&root, api_url, port, no_open),
        Commands::Assets => cmd::assets::run(&root, api_url, cli.json),
        Commands::Decide { action, asset_ids } => {
            cmd::decide::run(&root, api_url, &action, asset_ids, cli.json)
        }
        Commands::Batch { subcommand } => cmd::batch::run(&root, api_url, subcommand, cli.json),
        Commands::Purge { subcommand } => cmd::purge::run(&root, api_url, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, api_url, subcommand, cli.json),
        Commands::Auth(args) => cmd::auth::run(&root, api_url, args, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
