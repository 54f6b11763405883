//! `kintai` - GitHub activity ingestion and timesheet suggestions.

mod app;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use kintai_domain::{KintaiError, Owner, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kintai", version, about = "Turn GitHub activity into timesheet suggestions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Identity pair owning ledger and credential rows. Falls back to the
/// `KINTAI_ORG` / `KINTAI_USER` environment variables when flags are omitted.
#[derive(Args)]
pub struct IdentityArgs {
    /// Organization identifier
    #[arg(long)]
    org: Option<String>,

    /// User identifier (also the GitHub login)
    #[arg(long)]
    user: Option<String>,
}

impl IdentityArgs {
    pub fn resolve(self) -> Result<Owner> {
        let org = self
            .org
            .or_else(|| std::env::var("KINTAI_ORG").ok())
            .ok_or_else(|| KintaiError::InvalidInput("missing --org (or KINTAI_ORG)".into()))?;
        let user = self
            .user
            .or_else(|| std::env::var("KINTAI_USER").ok())
            .ok_or_else(|| KintaiError::InvalidInput("missing --user (or KINTAI_USER)".into()))?;
        Ok(Owner::new(org, user))
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a GitHub access token, encrypted at rest
    Connect {
        #[command(flatten)]
        identity: IdentityArgs,

        /// GitHub access token to store
        #[arg(long)]
        token: String,
    },

    /// Fetch new GitHub activity into the ledger
    Sync {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Month to sync (YYYY-MM); defaults to the trailing 7 days
        #[arg(long)]
        month: Option<String>,
    },

    /// List stored activity for a month
    Activities {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Month to list (YYYY-MM)
        #[arg(long)]
        month: String,
    },

    /// Suggest timesheet entries for a month
    Suggest {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Month to suggest for (YYYY-MM)
        #[arg(long)]
        month: String,

        /// Client identifier used to filter repositories of interest
        #[arg(long)]
        client: Option<String>,

        /// JSON file of existing timesheet entries, for conflict marking
        #[arg(long)]
        existing: Option<PathBuf>,
    },

    /// Print a freshly generated credential vault key
    GenerateKey,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match commands::run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
