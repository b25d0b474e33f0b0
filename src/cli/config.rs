use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Stored login session. One session per config directory, the CLI talks to
/// one deployment at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub base_url: String,
    pub email: String,
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("MANDATE_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("mandate").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("session.json"))
}

pub fn load_session() -> anyhow::Result<Option<Session>> {
    let session_file = session_file()?;
    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    let session: Session = serde_json::from_str(&content)?;
    Ok(Some(session))
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    let session_file = session_file()?;
    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}

/// Remove the stored session. Returns whether one existed.
pub fn clear_session() -> anyhow::Result<bool> {
    let session_file = session_file()?;
    if session_file.exists() {
        fs::remove_file(session_file)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

pub fn require_session() -> anyhow::Result<Session> {
    load_session()?.ok_or_else(|| anyhow::anyhow!("No stored session, run `mandate auth login` first"))
}

/// Base URL precedence: --server flag, then MANDATE_API_URL, then the stored
/// session, then localhost.
pub fn resolve_base_url(flag: Option<&str>) -> String {
    if let Some(url) = flag {
        return url.trim_end_matches('/').to_string();
    }
    if let Ok(url) = std::env::var("MANDATE_API_URL") {
        if !url.is_empty() {
            return url.trim_end_matches('/').to_string();
        }
    }
    if let Ok(Some(session)) = load_session() {
        return session.base_url;
    }
    DEFAULT_BASE_URL.to_string()
}
