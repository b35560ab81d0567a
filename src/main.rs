use clap::{Parser, Subcommand};
use colored::*;
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use jdocs::{
    config::Config,
    docs::IndexCell,
    fetch::HttpFetcher,
    provision::{ProvisionOutcome, Provisioner},
    query::QueryEngine,
    tools,
};

mod clean;
mod init;
mod render;
mod repl;
mod status;
mod syntax;

use clean::clean;
use init::init_config;
use render::{print_document, print_outcome, print_response, print_search_results};
use repl::run_repl;
use status::show_status;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "jdocs")]
#[command(about = "Search and read Java API documentation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Documentation store directory (overrides jdocs.toml)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Bundle URL to provision from (overrides jdocs.toml)
    #[arg(long, global = true)]
    bundle_url: Option<String>,

    /// Download timeout in seconds (overrides jdocs.toml)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Use the installed bundle as-is, without checking for updates
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and install the documentation bundle if it changed
    Provision,
    /// Search class, interface and enum names
    Search {
        /// Name fragment to look for
        query: String,
    },
    /// Show the documentation of a type
    Get {
        /// Fully qualified name, e.g. java.util.HashMap
        name: String,
        /// Syntax-highlight Java code blocks
        #[arg(long)]
        highlight: bool,
    },
    /// Invoke a named operation with JSON arguments, as a transport would
    Call {
        /// Operation name (search_docs or get_doc)
        tool: String,
        /// JSON object with the operation's arguments
        arguments: String,
    },
    /// List the available operations and their argument schemas
    Tools,
    /// Show the state of the documentation store
    Status,
    /// Interactive search mode
    Repl {
        /// Syntax-highlight Java code blocks
        #[arg(long)]
        highlight: bool,
    },
    /// Remove the installed documentation bundle
    Clean,
    /// Initialize a new jdocs.toml configuration file
    Init {
        /// Overwrite existing jdocs.toml if present
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "jdocs=debug" } else { "jdocs=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = Config::load().map_err(|e| e.to_string())?;

    // CLI flags override config file
    if let Some(store) = &cli.store {
        config.store_root = store.clone();
    }
    if let Some(url) = &cli.bundle_url {
        config.bundle_url = Some(url.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.fetch_timeout_secs = timeout;
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Bring the store up to date (unless offline) and build a query engine on it.
async fn prepare_engine(config: &Config, offline: bool) -> Result<QueryEngine, String> {
    let provisioner = Provisioner::new(config, HttpFetcher::new());
    if !offline {
        let outcome = provisioner.provision().await.map_err(|e| e.to_string())?;
        if matches!(outcome, ProvisionOutcome::Stale { .. }) {
            print_outcome(&outcome);
        }
    }

    let cell = IndexCell::new(provisioner.store().clone());
    Ok(QueryEngine::new(Arc::new(cell)))
}

async fn run(cli: Cli) -> Result<(), String> {
    // Init must work even when the existing jdocs.toml is broken
    if let Commands::Init { force } = cli.command {
        return init_config(force);
    }
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Provision => {
            let provisioner = Provisioner::new(&config, HttpFetcher::new());
            let outcome = provisioner.provision().await.map_err(|e| e.to_string())?;
            print_outcome(&outcome);
            Ok(())
        }
        Commands::Search { query } => {
            let engine = prepare_engine(&config, cli.offline).await?;
            let results = engine.search(&query).map_err(|e| e.to_string())?;
            print_search_results(&query, &results);
            Ok(())
        }
        Commands::Get { name, highlight } => {
            let engine = prepare_engine(&config, cli.offline).await?;
            let body = engine.retrieve(&name).map_err(|e| e.to_string())?;
            print_document(name.trim(), &body, highlight);
            Ok(())
        }
        Commands::Call { tool, arguments } => {
            let arguments: serde_json::Value = serde_json::from_str(&arguments)
                .map_err(|e| format!("Arguments are not valid JSON: {}", e))?;
            let engine = prepare_engine(&config, cli.offline).await?;
            let response = tools::dispatch(&engine, &tool, arguments);
            print_response(&response);
            if response.is_error {
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Tools => {
            let listing: Vec<_> = tools::descriptors()
                .into_iter()
                .map(|tool| {
                    serde_json::json!({
                        "name": tool.name,
                        "description": tool.description,
                        "inputSchema": tool.input_schema,
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&listing).map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        Commands::Status => show_status(&config),
        Commands::Repl { highlight } => {
            let engine = prepare_engine(&config, cli.offline).await?;
            run_repl(&engine, highlight).map_err(|e| e.to_string())
        }
        Commands::Clean => clean(&config),
        Commands::Init { .. } => unreachable!("handled before loading config"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("\n{} {}", "❌".red(), e.red());
        std::process::exit(1);
    }
}
