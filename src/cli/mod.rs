pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "mandate")]
#[command(about = "Mandate CLI - operator tooling for the back-office API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL, overrides the stored session and MANDATE_API_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Office-holder tenant roster")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Orphaned data reporting and migration")]
    Orphan {
        #[command(subcommand)]
        cmd: commands::orphan::OrphanCommands,
    },

    #[command(about = "Account administration")]
    Account {
        #[command(subcommand)]
        cmd: commands::account::AccountCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let server = cli.server.clone();

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, server, output_format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, server, output_format).await,
        Commands::Orphan { cmd } => commands::orphan::handle(cmd, server, output_format).await,
        Commands::Account { cmd } => commands::account::handle(cmd, server, output_format).await,
    }
}
