use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(response_fields) = response.as_object_mut() {
                    response_fields.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// GET an API endpoint and unwrap the success envelope.
pub async fn api_get(base_url: &str, path: &str, token: Option<&str>) -> anyhow::Result<Value> {
    request(reqwest::Method::GET, base_url, path, token, None).await
}

/// POST to an API endpoint and unwrap the success envelope.
pub async fn api_post(
    base_url: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<Value> {
    request(reqwest::Method::POST, base_url, path, token, body).await
}

// Every endpoint answers with {"success": bool, ...}. Unwrap "data" on
// success, surface the server's "error" text otherwise.
async fn request(
    method: reqwest::Method,
    base_url: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<Value> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);

    let client = reqwest::Client::new();
    let mut request = client.request(method, &url).timeout(REQUEST_TIMEOUT);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.with_context(|| format!("request to {} failed", url))?;
    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .with_context(|| format!("{} returned a non-JSON response ({})", url, status))?;

    if payload.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(payload.get("data").cloned().unwrap_or(Value::Null))
    } else {
        // Error bodies carry the text in "message", the health probe in "error"
        let message = payload
            .get("message")
            .or_else(|| payload.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("unknown server error");
        anyhow::bail!("{} (HTTP {})", message, status.as_u16())
    }
}
