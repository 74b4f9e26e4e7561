//! Basic command - health check and a session round trip.

use anyhow::{Context as _, Result};
use clap::Args;
use mix_client::{CreateSessionRequest, MixClient};

use super::{Context, banner, cleanup_sessions, field, finished, step, success};

/// Arguments for the basic command.
#[derive(Args, Debug)]
pub struct BasicArgs {
    /// Message to send into the new session
    #[arg(short, long, default_value = "Hello! This is a test message from the Mix CLI.")]
    pub message: String,
}

/// Run the basic command.
pub async fn run(args: BasicArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    banner("Mix - Basic Walkthrough");

    let mut created = Vec::new();
    let result = walkthrough(&client, &args, &mut created).await;
    cleanup_sessions(&client, &created).await;
    result?;

    finished("Basic");
    Ok(())
}

async fn walkthrough(client: &MixClient, args: &BasicArgs, created: &mut Vec<String>) -> Result<()> {
    step(1, "Checking server health...");
    let health = client
        .system()
        .health()
        .await
        .context("Health check failed")?;
    field("Status:", health.status_str());
    if let Some(version) = &health.version {
        field("Version:", version);
    }
    println!();

    step(2, "Listing sessions...");
    let before = client.sessions().list().await.context("Failed to list sessions")?;
    field("Sessions:", before.len());
    println!();

    step(3, "Creating a session...");
    let session = client
        .sessions()
        .create(CreateSessionRequest::new("Basic Walkthrough Session"))
        .await
        .context("Failed to create session")?;
    created.push(session.id.clone());
    success(format!("Created session {}", session.id));
    println!();

    step(4, "Fetching the session...");
    let fetched = client
        .sessions()
        .get(&session.id)
        .await
        .context("Failed to get session")?;
    field("ID:", &fetched.id);
    field("Title:", &fetched.title);
    field("Created:", fetched.created_at.to_rfc3339());
    println!();

    step(5, "Sending a message...");
    client
        .messages()
        .send(&session.id, args.message.as_str())
        .await
        .context("Failed to send message")?;
    success("Message sent");
    super::note("The server processes messages asynchronously");
    println!();

    step(6, "Listing sessions again...");
    let during = client.sessions().list().await.context("Failed to list sessions")?;
    field("Sessions:", during.len());
    println!();

    step(7, "Deleting the session...");
    client
        .sessions()
        .delete(&session.id)
        .await
        .context("Failed to delete session")?;
    created.retain(|id| id != &session.id);
    success(format!("Deleted session {}", session.id));
    println!();

    step(8, "Verifying deletion...");
    let after = client.sessions().list().await.context("Failed to list sessions")?;
    if after.iter().any(|s| s.id == session.id) {
        anyhow::bail!("Session {} still listed after deletion", session.id);
    }
    field("Sessions:", after.len());
    success("Session no longer listed");

    Ok(())
}
