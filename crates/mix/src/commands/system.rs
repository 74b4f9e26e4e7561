//! System command - server health, slash commands and MCP servers.

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::json;

use super::{Context, banner, failure, field, finished, note, print_json, step, success, truncate};

/// Arguments for the system command.
#[derive(Args, Debug)]
pub struct SystemArgs {
    /// Show details for this command instead of the first one listed
    #[arg(long)]
    pub command: Option<String>,
}

/// Run the system command.
pub async fn run(args: SystemArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if ctx.json_output {
        let health = client.system().health().await.context("Health check failed")?;
        let commands = client
            .system()
            .commands()
            .await
            .context("Failed to list commands")?;
        let mcp = client
            .system()
            .mcp_servers()
            .await
            .context("Failed to list MCP servers")?;
        return print_json(&json!({
            "health": health,
            "commands": commands,
            "mcp_servers": mcp,
        }));
    }

    banner("Mix - System Walkthrough");

    step(1, "Checking server health...");
    let health = client.system().health().await.context("Health check failed")?;
    field("Status:", health.status_str());
    if let Some(version) = &health.version {
        field("Version:", version);
    }
    if let Some(timestamp) = &health.timestamp {
        field("Time:", timestamp);
    }
    println!();

    step(2, "Listing commands...");
    let commands = client
        .system()
        .commands()
        .await
        .context("Failed to list commands")?;
    field("Found:", commands.len());
    for command in &commands {
        println!(
            "   /{} - {}",
            command.name.as_deref().unwrap_or("?"),
            truncate(command.description.as_deref().unwrap_or(""), 60)
        );
    }
    println!();

    let detail_name = args
        .command
        .clone()
        .or_else(|| commands.iter().find_map(|c| c.name.clone()));
    if let Some(name) = detail_name {
        step(3, &format!("Command details for /{}...", name));
        match client.system().command(&name).await {
            Ok(info) => {
                if let Some(description) = &info.description {
                    field("Description:", description);
                }
                if let Some(usage) = &info.usage {
                    field("Usage:", usage);
                }
            }
            Err(e) => failure("get command", e),
        }
        println!();
    }

    step(4, "Listing MCP servers...");
    let servers = match client.system().mcp_servers().await {
        Ok(servers) => servers,
        Err(e) => {
            failure("list MCP servers", e);
            Vec::new()
        }
    };
    if servers.is_empty() {
        note("No MCP servers configured");
    }
    let mut tool_count = 0;
    for server in &servers {
        let mark = if server.connected { "connected" } else { "disconnected" };
        println!("   - {} [{}] {}", server.name, mark, server.status);
        if let Some(tools) = &server.tools {
            tool_count += tools.len();
            for tool in tools {
                println!(
                    "       {} {}",
                    tool.name,
                    truncate(tool.description.as_deref().unwrap_or(""), 50)
                );
            }
        }
    }
    println!();

    step(5, "Summary");
    field("Healthy:", client.system().is_healthy().await);
    field("Commands:", commands.len());
    field(
        "MCP servers:",
        format!(
            "{} ({} connected)",
            servers.len(),
            servers.iter().filter(|s| s.connected).count()
        ),
    );
    field("MCP tools:", tool_count);
    success("System information retrieved");

    finished("System");
    Ok(())
}
