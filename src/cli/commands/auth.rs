use clap::Subcommand;
use serde_json::json;

use crate::cli::{config, utils, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store a session token")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (falls back to MANDATE_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Show the stored session")]
    Status,

    #[command(about = "Drop the stored session")]
    Logout,

    #[command(about = "Ask the server who the stored token belongs to")]
    Whoami,
}

pub async fn handle(
    cmd: AuthCommands,
    server: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = password
                .or_else(|| std::env::var("MANDATE_PASSWORD").ok().filter(|p| !p.is_empty()))
                .ok_or_else(|| {
                    anyhow::anyhow!("No password given, pass --password or set MANDATE_PASSWORD")
                })?;

            let base_url = config::resolve_base_url(server.as_deref());
            let data = utils::api_post(
                &base_url,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

            let token = data["token"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("login response carried no token"))?;

            config::save_session(&config::Session {
                base_url,
                email: email.clone(),
                token: token.to_string(),
                saved_at: chrono::Utc::now(),
            })?;

            let name = data["account"]["name"].as_str().unwrap_or(email.as_str());
            let role = data["account"]["role"].as_str().unwrap_or("unknown");
            utils::output_success(
                &output_format,
                &format!("Logged in as {} ({})", name, role),
                Some(json!({ "account": data["account"] })),
            )
        }

        AuthCommands::Status => {
            match config::load_session()? {
                Some(session) => match output_format {
                    OutputFormat::Json => {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "base_url": session.base_url,
                                "email": session.email,
                                "saved_at": session.saved_at,
                            }))?
                        );
                    }
                    OutputFormat::Text => {
                        println!("Logged in as {}", session.email);
                        println!("Server: {}", session.base_url);
                        println!("Since:  {}", session.saved_at);
                    }
                },
                None => {
                    utils::output_error(&output_format, "No stored session")?;
                }
            }
            Ok(())
        }

        AuthCommands::Logout => {
            if config::clear_session()? {
                utils::output_success(&output_format, "Session dropped", None)
            } else {
                utils::output_error(&output_format, "No stored session")?;
                Ok(())
            }
        }

        AuthCommands::Whoami => {
            let session = config::require_session()?;
            let base_url = config::resolve_base_url(server.as_deref());
            let principal = utils::api_get(&base_url, "/api/auth/whoami", Some(&session.token)).await?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&principal)?),
                OutputFormat::Text => {
                    println!(
                        "{} <{}>",
                        principal["name"].as_str().unwrap_or("?"),
                        principal["email"].as_str().unwrap_or("?")
                    );
                    println!("Role:   {}", principal["role"].as_str().unwrap_or("?"));
                    match principal["effective_tenant_id"].as_str() {
                        Some(tenant) => println!("Tenant: {}", tenant),
                        None => println!("Tenant: (all, admin scope)"),
                    }
                }
            }
            Ok(())
        }
    }
}
