//! Tools command - LLM tools and their credentials.

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;
use mix_client::{LlmTool, ToolCredentialsStatus};
use serde_json::json;

use super::{Context, banner, failure, field, finished, note, print_json, step, truncate};

/// Arguments for the tools command.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Print each tool's parameter schema
    #[arg(long)]
    pub schemas: bool,
}

/// Run the tools command.
pub async fn run(args: ToolsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if ctx.json_output {
        let tools = client.tools().list().await.context("Failed to list tools")?;
        let credentials = client
            .tools()
            .credentials()
            .await
            .context("Failed to get tool credentials")?;
        return print_json(&json!({
            "tools": tools,
            "credentials": credentials,
        }));
    }

    banner("Mix - Tools Walkthrough");

    step(1, "Listing LLM tools...");
    let tools = client.tools().list().await.context("Failed to list tools")?;
    field("Found:", tools.len());
    for tool in &tools {
        println!(
            "   - {} {}",
            tool.name.as_deref().unwrap_or("?"),
            Style::new()
                .dim()
                .apply_to(truncate(tool.description.as_deref().unwrap_or(""), 60))
        );
        if !tool.required.is_empty() {
            field("    Required:", tool.required.join(", "));
        }
        if args.schemas
            && let Some(params) = &tool.parameters
        {
            println!("{}", serde_json::to_string_pretty(params)?);
        }
    }
    println!();

    step(2, "Tool status...");
    match client.tools().status().await {
        Ok(status) => println!("{}", serde_json::to_string_pretty(&status)?),
        Err(e) => failure("get tool status", e),
    }
    println!();

    step(3, "Credentials by category...");
    let credentials = match client.tools().credentials().await {
        Ok(c) => c,
        Err(e) => {
            failure("get tool credentials", e);
            ToolCredentialsStatus::default()
        }
    };
    print_credentials(&credentials);
    println!();

    step(4, "Analysis");
    let analysis = Analysis::new(&tools, &credentials);
    field("Tools:", analysis.tools);
    field("With required parameters:", analysis.with_required);
    field(
        "Credentialed tools:",
        format!("{}/{}", analysis.authenticated, analysis.credentialed),
    );
    if analysis.authenticated < analysis.credentialed {
        note("Configure missing credentials with `mix auth`");
    }

    finished("Tools");
    Ok(())
}

fn print_credentials(credentials: &ToolCredentialsStatus) {
    if credentials.categories.is_empty() {
        note("No credential categories reported");
        return;
    }
    let yes = Style::new().green();
    let no = Style::new().red();
    for (key, category) in &credentials.categories {
        println!("   {}", category.display_name.as_deref().unwrap_or(key));
        for tool in &category.tools {
            let name = tool
                .display_name
                .as_deref()
                .or(tool.name.as_deref())
                .unwrap_or("?");
            if tool.authenticated.unwrap_or(false) {
                println!("     {} {}", yes.apply_to("✓"), name);
            } else {
                println!("     {} {}", no.apply_to("✗"), name);
            }
        }
    }
}

/// Counts shown in the closing summary.
#[derive(Debug, PartialEq)]
struct Analysis {
    tools: usize,
    with_required: usize,
    credentialed: usize,
    authenticated: usize,
}

impl Analysis {
    fn new(tools: &[LlmTool], credentials: &ToolCredentialsStatus) -> Self {
        let all = credentials.categories.values().flat_map(|c| &c.tools);
        Self {
            tools: tools.len(),
            with_required: tools.iter().filter(|t| !t.required.is_empty()).count(),
            credentialed: all.clone().count(),
            authenticated: all.filter(|t| t.authenticated.unwrap_or(false)).count(),
        }
    }
}
