//! Resource collection commands: list, get, create, lifecycle actions.

use super::{ensure_login, Context};
use crate::output::{self, OutputFormat};
use anyhow::{Context as _, Result};
use desk_client::RequestOptions;
use desk_resource::{Resource, ResourceOptions};

/// Append query parameters to a collection path.
fn with_query(path: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let mut url = path.to_string();
    for (i, (key, value)) in params.iter().enumerate() {
        let sep = if i == 0 && !path.contains('?') { '?' } else { '&' };
        url.push(sep);
        url.push_str(&format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(value)
        ));
    }
    url
}

/// List a collection through a resource subscription.
pub async fn list(
    ctx: &Context,
    path: &str,
    ordering: Option<&str>,
    page_size: Option<u32>,
    filters: &[String],
) -> Result<()> {
    ensure_login(ctx).await?;

    let mut params: Vec<(String, String)> = Vec::new();
    if let Some(ordering) = ordering {
        params.push(("ordering".to_string(), ordering.to_string()));
    }
    if let Some(size) = page_size {
        params.push(("page_size".to_string(), size.to_string()));
    }
    for filter in filters {
        let (key, value) = filter
            .split_once('=')
            .with_context(|| format!("filter must be key=value, got {filter:?}"))?;
        params.push((key.to_string(), value.to_string()));
    }

    let full_path = with_query(path, &params);
    let resource = Resource::new(
        ctx.client.clone(),
        ctx.session.clone(),
        &full_path,
        ResourceOptions::default(),
    );
    resource.load().await;

    let state = resource.state();
    if let Some(error) = state.error {
        output::print_error(&error, &ctx.format);
        return Ok(());
    }

    let page = resource.list();
    match ctx.format {
        OutputFormat::Text => {
            output::print_heading(&format!("{} ({} of {} total)", path, page.len(), page.total));
            if page.is_empty() {
                println!("  (no records)");
            }
            for item in &page.items {
                let id = item.get("id").map(|v| v.to_string()).unwrap_or_default();
                let label = item
                    .get("ticket_number")
                    .or_else(|| item.get("name"))
                    .or_else(|| item.get("title"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("-");
                let summary = item
                    .get("title")
                    .or_else(|| item.get("description"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                println!("  {:<6} {:<14} {}", id, label, summary);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({"items": page.items, "total": page.total});
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

/// Fetch an arbitrary path and print the payload.
pub async fn get(ctx: &Context, path: &str) -> Result<()> {
    ensure_login(ctx).await?;

    match ctx.client.execute(path, RequestOptions::get()).await {
        Ok(payload) => {
            match payload {
                desk_client::Payload::Json(json) => output::print_value(&json, &ctx.format),
                desk_client::Payload::Text(text) => println!("{}", text),
            }
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.user_message("Request failed."), &ctx.format);
            Ok(())
        }
    }
}

/// Create a record in a collection.
pub async fn create(ctx: &Context, collection: &str, data: &str) -> Result<()> {
    ensure_login(ctx).await?;

    let body: serde_json::Value =
        serde_json::from_str(data).context("--data must be a JSON object")?;

    match ctx.client.execute(collection, RequestOptions::post(body)).await {
        Ok(payload) => {
            let ticket = payload
                .str_field("ticket_number")
                .or_else(|| payload.str_field("ticket"));
            match ticket {
                Some(ticket) => {
                    output::print_success(&format!("Created {}", ticket), &ctx.format)
                }
                None => output::print_success("Created", &ctx.format),
            }
            if let Some(json) = payload.as_json() {
                output::print_value(json, &ctx.format);
            }
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.user_message("Unable to create record."), &ctx.format);
            Ok(())
        }
    }
}

/// Run a named lifecycle action on a record, e.g. `approve` or `publish`.
pub async fn action(ctx: &Context, collection: &str, id: &str, name: &str) -> Result<()> {
    ensure_login(ctx).await?;

    let path = format!(
        "{}/{}/{}/",
        collection.trim_end_matches('/'),
        id,
        name.trim_matches('/')
    );

    match ctx.client.execute(&path, RequestOptions::post_empty()).await {
        Ok(payload) => {
            output::print_success(&format!("{} applied", name), &ctx.format);
            if let Some(json) = payload.as_json() {
                output::print_value(json, &ctx.format);
            }
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.user_message("Action failed."), &ctx.format);
            Ok(())
        }
    }
}
