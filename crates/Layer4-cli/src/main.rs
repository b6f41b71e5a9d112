//! ToolGate CLI - Main entry point

mod commands;
mod init;

use clap::{Parser, Subcommand};
use commands::{ExportTarget, SearchArgs};
use std::path::PathBuf;
use toolgate_core::Gateway;
use toolgate_foundation::{GatewayConfig, McpConfig, SearchType, ToolSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ToolGate - one gateway in front of many tool backends
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Gateway config file (.json / .toml), overrides global + project config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend registry file (mcp.json format)
    #[arg(long, global = true)]
    mcp_config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize ToolGate in the current directory
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Start every backend and show readiness
    Status,
    /// List the tools each backend exposes
    Tools,
    /// Call a tool on a backend
    Call {
        server: String,
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Catalog maintenance
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Search the tool catalog
    Search {
        query: String,
        /// auto, bm25, regex or hybrid
        #[arg(long = "type")]
        search_type: Option<SearchType>,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        category: Option<String>,
        /// mcp, compiled_crate, subagent or builtin
        #[arg(long)]
        source: Option<ToolSource>,
        #[arg(long)]
        min_score: Option<f64>,
    },
    /// Complete a partial search query
    Suggest {
        partial: String,
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
    /// Catalog statistics and context token estimate
    Stats,
    /// Export the catalog
    Export {
        #[command(subcommand)]
        target: ExportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Build the catalog from every producer and save it
    Build {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ExportCommand {
    /// Anthropic tool definitions with defer_loading
    Anthropic {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Prepend the search_tools definition if absent
        #[arg(long)]
        with_search_tool: bool,
    },
    /// Editor settings document
    Editor {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout carries command output)
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Command::Init { force } = args.command {
        return init::init_project(&std::env::current_dir()?, force);
    }

    let config = match &args.config {
        Some(path) => GatewayConfig::load_from(path)?,
        None => GatewayConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load gateway config: {}", e);
            GatewayConfig::default()
        }),
    };
    let backends = match &args.mcp_config {
        Some(path) => McpConfig::load_from(path)?,
        None => McpConfig::load()?,
    };
    let gateway = Gateway::new(config, backends);

    match args.command {
        Command::Init { .. } => Ok(()),
        Command::Status => commands::status(&gateway).await,
        Command::Tools => commands::tools(&gateway).await,
        Command::Call { server, tool, args } => {
            commands::call(&gateway, &server, &tool, &args).await
        }
        Command::Catalog {
            command: CatalogCommand::Build { output },
        } => commands::build_catalog(&gateway, output.as_deref()).await,
        Command::Search {
            query,
            search_type,
            limit,
            category,
            source,
            min_score,
        } => {
            let search = SearchArgs {
                query,
                search_type,
                limit,
                category,
                source,
                min_score,
            };
            commands::search(&gateway, search).await
        }
        Command::Suggest { partial, limit } => commands::suggest(&gateway, &partial, limit).await,
        Command::Stats => commands::stats(&gateway).await,
        Command::Export { target } => {
            let (target, output) = match target {
                ExportCommand::Anthropic {
                    output,
                    with_search_tool,
                } => (ExportTarget::Anthropic { with_search_tool }, output),
                ExportCommand::Editor { output } => (ExportTarget::Editor, output),
            };
            commands::export(&gateway, target, output.as_deref()).await
        }
    }
}
