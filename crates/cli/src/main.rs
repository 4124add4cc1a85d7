//! Printshop CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ps-cli migrate
//!
//! # Create a staff account for the admin panel
//! ps-cli staff create -u alex -e alex@example.com -p 'a long password'
//!
//! # Add the demo catalog (safe to run more than once)
//! ps-cli seed products
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ps-cli")]
#[command(author, version, about = "Printshop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Insert demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new staff user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Demo catalog products
    Products,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Staff { action } => match action {
            StaffAction::Create {
                username,
                email,
                password,
            } => {
                commands::staff::create(&username, email.as_deref(), &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products => {
                commands::seed::products().await?;
            }
        },
    }
    Ok(())
}
