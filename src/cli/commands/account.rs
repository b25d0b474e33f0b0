use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::{config, utils, OutputFormat};

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "Bind an account to an office-holder tenant")]
    Bind {
        #[arg(help = "Account id to rebind")]
        account_id: Uuid,
        #[arg(long, help = "Target office-holder id (omit for office-holders, they self-bind)")]
        tenant: Option<Uuid>,
    },
}

pub async fn handle(
    cmd: AccountCommands,
    server: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AccountCommands::Bind { account_id, tenant } => {
            let session = config::require_session()?;
            let base_url = config::resolve_base_url(server.as_deref());
            let account = utils::api_post(
                &base_url,
                &format!("/api/root/accounts/{}/bind", account_id),
                Some(&session.token),
                Some(json!({ "tenant_id": tenant })),
            )
            .await?;

            let bound_to = account["tenant_id"].as_str().unwrap_or("none");
            utils::output_success(
                &output_format,
                &format!(
                    "Account {} ({}) bound to tenant {}",
                    account["name"].as_str().unwrap_or("?"),
                    account_id,
                    bound_to
                ),
                Some(json!({ "account": account })),
            )
        }
    }
}
