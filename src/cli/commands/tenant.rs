use clap::Subcommand;
use serde_json::Value;

use crate::cli::{config, utils, OutputFormat};

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List office-holder tenants")]
    List,
}

pub async fn handle(
    cmd: TenantCommands,
    server: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::List => {
            let session = config::require_session()?;
            let base_url = config::resolve_base_url(server.as_deref());
            let tenants = utils::api_get(&base_url, "/api/root/tenants", Some(&session.token)).await?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tenants)?),
                OutputFormat::Text => {
                    let rows = tenants.as_array().cloned().unwrap_or_default();
                    if rows.is_empty() {
                        println!("No office-holder tenants registered");
                        return Ok(());
                    }
                    for row in rows {
                        println!(
                            "{}  {} <{}>{}",
                            row["id"].as_str().unwrap_or("?"),
                            row["name"].as_str().unwrap_or("?"),
                            row["email"].as_str().unwrap_or("?"),
                            if row["active"] == Value::Bool(false) { "  [inactive]" } else { "" }
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
