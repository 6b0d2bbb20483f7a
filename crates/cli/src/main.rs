//! CloudMart CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Create or update the documents table
//! cloudmart-cli migrate
//!
//! # Insert the demo catalog into an empty store
//! cloudmart-cli seed
//!
//! # Insert any demo products that are missing, even if the catalog is not empty
//! cloudmart-cli seed --missing-only
//!
//! # Remove cart lines already turned into an order
//! cloudmart-cli sweep --user demo_user
//! ```
//!
//! All commands read `CLOUDMART_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "cloudmart-cli")]
#[command(author, version, about = "CloudMart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the demo product catalog
    Seed {
        /// Insert missing demo products even when the catalog is not empty
        #[arg(long)]
        missing_only: bool,
    },
    /// Delete cart lines that an existing order already consumed
    Sweep {
        /// User whose cart is checked (defaults to `CLOUDMART_DEMO_USER`)
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { missing_only } => commands::seed::run(missing_only).await?,
        Commands::Sweep { user } => commands::sweep::run(user).await?,
    }
    Ok(())
}
