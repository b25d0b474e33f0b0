use clap::Subcommand;
use serde_json::Value;
use uuid::Uuid;

use crate::cli::{config, utils, OutputFormat};

const KINDS: [&str; 8] = [
    "accounts",
    "leaders",
    "voters",
    "visits",
    "help_records",
    "appointments",
    "law_projects",
    "amendments",
];

#[derive(Subcommand)]
pub enum OrphanCommands {
    #[command(about = "Count rows that have no tenant")]
    Stats,

    #[command(about = "Adopt every orphaned row into an office-holder's tenant")]
    Migrate {
        #[arg(help = "Target office-holder account id")]
        tenant_id: Uuid,
    },
}

pub async fn handle(
    cmd: OrphanCommands,
    server: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        OrphanCommands::Stats => {
            let session = config::require_session()?;
            let base_url = config::resolve_base_url(server.as_deref());
            let counts = utils::api_get(&base_url, "/api/root/orphans", Some(&session.token)).await?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&counts)?),
                OutputFormat::Text => {
                    let mut total = 0;
                    for kind in KINDS {
                        let count = counts[kind].as_i64().unwrap_or(0);
                        total += count;
                        println!("{:<14} {}", kind, count);
                    }
                    println!("{:<14} {}", "total", total);
                }
            }
            Ok(())
        }

        OrphanCommands::Migrate { tenant_id } => {
            let session = config::require_session()?;
            let base_url = config::resolve_base_url(server.as_deref());
            let outcome = utils::api_post(
                &base_url,
                &format!("/api/root/orphans/migrate/{}", tenant_id),
                Some(&session.token),
                None,
            )
            .await?;

            let moved: i64 = KINDS.iter().map(|kind| outcome[*kind].as_i64().unwrap_or(0)).sum();
            utils::output_success(
                &output_format,
                &format!("Migrated {} orphaned rows into tenant {}", moved, tenant_id),
                Some(Value::Object(
                    outcome.as_object().cloned().unwrap_or_default(),
                )),
            )
        }
    }
}
