//! myNGO CLI - Database migrations, seeding and development tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! myngo-cli migrate
//!
//! # Load the states lookup table
//! myngo-cli seed states --file crates/cli/seed/states.yaml
//!
//! # Mint a bearer token for local testing
//! myngo-cli token issue --user-id 1 --email dev@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed states` - Upsert reference states from YAML
//! - `token issue` - Sign a development access token

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "myngo-cli")]
#[command(author, version, about = "myNGO CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Work with access tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert states from a YAML file
    States {
        /// Path to the states YAML file
        #[arg(short, long, default_value = "crates/cli/seed/states.yaml")]
        file: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Sign a token for an existing user id
    Issue {
        /// Owner user id
        #[arg(short, long)]
        user_id: i32,

        /// Email claim
        #[arg(short, long)]
        email: Option<String>,

        /// Token lifetime in hours
        #[arg(short, long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::States { file } => commands::seed::states(&file).await?,
        },
        Commands::Token { action } => match action {
            TokenAction::Issue {
                user_id,
                email,
                ttl_hours,
            } => commands::token::issue(user_id, email.as_deref(), ttl_hours)?,
        },
    }
    Ok(())
}
