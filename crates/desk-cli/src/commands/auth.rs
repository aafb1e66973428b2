//! Authentication commands.

use super::{ensure_login, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use desk_session::UserProfile;

fn print_profile(user: &UserProfile, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            output::print_row("User", &user.display_name());
            output::print_row("Email", &user.email);
            if let Some(role) = &user.role {
                output::print_row("Role", role);
            }
            if user.is_superuser {
                output::print_row("Superuser", "yes");
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(user) {
                println!("{}", json);
            }
        }
    }
}

/// Login and print the authenticated profile.
pub async fn login(ctx: &Context) -> Result<()> {
    match ensure_login(ctx).await {
        Ok(user) => {
            output::print_success(&format!("Logged in as {}", user.display_name()), &ctx.format);
            print_profile(&user, &ctx.format);
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.to_string(), &ctx.format);
            Ok(())
        }
    }
}

/// Check session status: bootstrap locally, then verify with the server.
pub async fn status(ctx: &Context) -> Result<()> {
    let bootstrapped = ctx.session.bootstrap();
    let verified = ctx.session.verify().await;
    let settled = ctx.session.status();

    match ctx.format {
        OutputFormat::Text => {
            output::print_row("Bootstrap", &format!("{bootstrapped:?}"));
            output::print_row("Verified", if verified { "yes" } else { "no" });
            output::print_row("Status", &format!("{settled:?}"));
            if let Some(user) = ctx.session.current_user() {
                output::print_row("User", &user.display_name());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "status": settled,
                "verified": verified,
                "user": ctx.session.current_user(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

/// Impersonate a user for the rest of the invocation, then restore.
pub async fn impersonate(ctx: &Context, user_id: i64) -> Result<()> {
    ensure_login(ctx).await?;

    match ctx.session.impersonate(user_id).await {
        Ok(user) => {
            output::print_success(
                &format!("Impersonating {}", user.display_name()),
                &ctx.format,
            );
            print_profile(&user, &ctx.format);
        }
        Err(e) => {
            output::print_error(&format!("Impersonation failed: {}", e), &ctx.format);
            return Ok(());
        }
    }

    match ctx.session.stop_impersonating().await {
        Ok(restored) => {
            output::print_success(
                &format!("Restored identity {}", restored.display_name()),
                &ctx.format,
            );
        }
        Err(e) => {
            output::print_error(&format!("Failed to stop impersonating: {}", e), &ctx.format);
        }
    }
    Ok(())
}
