//! CLI command implementations.

pub mod auth;
pub mod resources;

use crate::output::OutputFormat;
use anyhow::{Context as _, Result};
use desk_client::ApiClient;
use desk_session::{SessionManager, UserProfile};
use std::io::{self, Write};
use std::sync::Arc;

/// Shared state for one CLI invocation.
pub struct Context {
    pub client: Arc<ApiClient>,
    pub session: Arc<SessionManager>,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(api_base_url: &str, format: OutputFormat) -> Result<Self> {
        let client = Arc::new(
            ApiClient::new(api_base_url)
                .with_context(|| format!("invalid API base URL: {api_base_url}"))?,
        );
        let session = Arc::new(SessionManager::new(client.clone()));
        Ok(Self {
            client,
            session,
            format,
        })
    }
}

/// Authenticate the invocation's session.
///
/// Credentials come from `DESK_USERNAME`/`DESK_PASSWORD` when set, otherwise
/// from interactive prompts. The session cookie lives in the process-local
/// jar, so each invocation logs in once up front.
pub async fn ensure_login(ctx: &Context) -> Result<UserProfile> {
    let username = match std::env::var("DESK_USERNAME") {
        Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => prompt("Username: ")?,
    };
    if username.is_empty() {
        anyhow::bail!("username is required");
    }

    let password = match std::env::var("DESK_PASSWORD") {
        Ok(pass) if !pass.is_empty() => pass,
        _ => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        anyhow::bail!("password is required");
    }

    let totp_code = std::env::var("DESK_TOTP_CODE").ok();

    ctx.session
        .login(&username, &password, totp_code.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
