//! Amork CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! amork-cli migrate
//!
//! # Insert the demo catalog (only when the menu is empty)
//! amork-cli seed
//!
//! # Create a promotion code valid for 30 days
//! amork-cli promo create --code WELCOME10 --percent 10 --valid-days 30
//! ```
//!
//! # Environment Variables
//!
//! - `AMORK_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "amork-cli")]
#[command(author, version, about = "Amork CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo categories and foods into an empty menu
    Seed,
    /// Manage promotion codes
    Promo {
        #[command(subcommand)]
        action: PromoAction,
    },
}

#[derive(Subcommand)]
enum PromoAction {
    /// Create a new promotion code
    Create {
        /// Code customers type at checkout
        #[arg(short, long)]
        code: String,

        /// Discount percent, 0 to 100
        #[arg(short, long)]
        percent: Decimal,

        /// Text shown next to the code
        #[arg(short, long)]
        description: Option<String>,

        /// Days until the code expires; omit for no expiry
        #[arg(long)]
        valid_days: Option<i64>,

        /// Create the code switched off
        #[arg(long)]
        inactive: bool,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Promo { action } => match action {
            PromoAction::Create {
                code,
                percent,
                description,
                valid_days,
                inactive,
            } => {
                commands::promo::create(
                    &code,
                    percent,
                    description.as_deref(),
                    valid_days,
                    !inactive,
                )
                .await?;
            }
        },
    }
    Ok(())
}
