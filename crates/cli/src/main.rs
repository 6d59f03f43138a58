//! ReadyMix CLI - diagnostics and demo-data tools.
//!
//! # Usage
//!
//! ```bash
//! # Verify the hosted backend is reachable
//! rmx-cli check
//!
//! # Seed demo inquiries and orders (staff credentials required)
//! rmx-cli seed -e ops@readymix.example -p <password>
//! ```
//!
//! # Commands
//!
//! - `check` - Probe the hosted backend's health endpoint
//! - `seed`  - Sign in and create representative inquiries and orders
//!
//! Backend settings come from the same environment variables as the
//! binaries (`BACKEND_API_BASE`, `BACKEND_PROJECT`, `BACKEND_API_KEY`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;
mod env;

#[derive(Parser)]
#[command(name = "rmx-cli")]
#[command(author, version, about = "ReadyMix CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the hosted backend's health endpoint
    Check,
    /// Seed demo inquiries and orders through the stores
    Seed {
        /// Staff email (falls back to `READYMIX_STAFF_EMAIL`)
        #[arg(short, long)]
        email: Option<String>,

        /// Staff password (falls back to `READYMIX_STAFF_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
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
        Commands::Check => commands::check::run().await?,
        Commands::Seed { email, password } => {
            let email = env::or_env(email, "READYMIX_STAFF_EMAIL")?;
            let password = env::or_env(password, "READYMIX_STAFF_PASSWORD")?;
            commands::seed::run(&email, &password).await?;
        }
    }
    Ok(())
}
