//! desk - command-line client for the service desk REST API.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Context;
use desk_core::{Config, Paths};

/// Command-line client for the service desk REST API.
#[derive(Parser)]
#[command(name = "desk")]
#[command(about = "Service desk API client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides config file)
    #[arg(long, env = "DESK_API_URL", global = true)]
    api_url: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Login and print the authenticated profile
    Login,

    /// Check session status against the server
    Status,

    /// List a collection, e.g. incidents/incidents/
    List {
        /// Collection path
        path: String,
        /// Server-side ordering, e.g. -created_at
        #[arg(long)]
        ordering: Option<String>,
        /// Page size
        #[arg(long)]
        page_size: Option<u32>,
        /// Filter query params as key=value (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
    },

    /// Fetch an arbitrary API path
    Get {
        /// Path relative to the API base URL
        path: String,
    },

    /// Create a record in a collection
    Create {
        /// Collection path, e.g. incidents/incidents/
        collection: String,
        /// Record fields as a JSON object
        #[arg(long)]
        data: String,
    },

    /// Run a lifecycle action on a record, e.g. approve or publish
    Action {
        /// Collection path, e.g. changes/changes/
        collection: String,
        /// Record id
        id: String,
        /// Action name
        action: String,
    },

    /// Impersonate a user and restore the original identity
    Impersonate {
        /// Target user id
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    desk_core::init_logging(&cli.log_level);

    let config = match Paths::new() {
        Ok(paths) => Config::load(&paths).unwrap_or_default(),
        Err(_) => Config::new(),
    };
    let api_url = cli.api_url.unwrap_or(config.api_base_url);
    tracing::debug!(api_url = %api_url, "Resolved API base URL");

    let ctx = Context::new(&api_url, cli.format)?;

    match cli.command {
        Commands::Login => commands::auth::login(&ctx).await,
        Commands::Status => commands::auth::status(&ctx).await,
        Commands::List {
            path,
            ordering,
            page_size,
            filters,
        } => {
            commands::resources::list(&ctx, &path, ordering.as_deref(), page_size, &filters).await
        }
        Commands::Get { path } => commands::resources::get(&ctx, &path).await,
        Commands::Create { collection, data } => {
            commands::resources::create(&ctx, &collection, &data).await
        }
        Commands::Action {
            collection,
            id,
            action,
        } => commands::resources::action(&ctx, &collection, &id, &action).await,
        Commands::Impersonate { user_id } => commands::auth::impersonate(&ctx, user_id).await,
    }
}
