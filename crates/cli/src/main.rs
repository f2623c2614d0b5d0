//! Cartline CLI - database migrations and data management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! cartline-cli migrate
//!
//! # Load catalog products from YAML
//! cartline-cli seed products crates/cli/seed/products.yaml
//!
//! # Create an empty user document
//! cartline-cli user create
//! ```
//!
//! All commands read `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`), loading
//! `.env` first when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cartline_core::UserId;

mod commands;

#[derive(Parser)]
#[command(name = "cartline-cli")]
#[command(author, version, about = "Cartline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage user documents
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert catalog products from a YAML file
    Products {
        /// Path to the YAML file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user with an empty cart, no addresses and no orders
    Create {
        /// Use this ID instead of generating one
        #[arg(long)]
        id: Option<UserId>,
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

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
        Commands::User { action } => match action {
            UserAction::Create { id } => commands::user::create(id).await?,
        },
    }
    Ok(())
}
