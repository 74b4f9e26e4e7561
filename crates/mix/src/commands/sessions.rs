//! Sessions command - the full session lifecycle.

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use mix_client::{
    Callback, CallbackType, CreateSessionRequest, ForkSessionRequest, MixClient, SessionType,
};

use super::{
    Context, banner, cleanup_sessions, failure, field, finished, note, step, success, truncate,
};

const PROMPTS: &[&str] = &[
    "What is 2 + 2?",
    "What is the capital of France?",
    "Tell me a short joke",
];

/// Arguments for the sessions command.
#[derive(Args, Debug)]
pub struct SessionsArgs {
    /// Seconds to wait for the server to process messages
    #[arg(long, default_value_t = 2)]
    pub wait: u64,
}

/// Run the sessions command.
pub async fn run(args: SessionsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    banner("Mix - Sessions Walkthrough");

    let mut created = Vec::new();
    let result = walkthrough(&client, &args, &mut created).await;
    cleanup_sessions(&client, &created).await;
    result?;

    finished("Sessions");
    Ok(())
}

async fn walkthrough(
    client: &MixClient,
    args: &SessionsArgs,
    created: &mut Vec<String>,
) -> Result<()> {
    step(1, "Listing existing sessions...");
    let sessions = client.sessions().list().await.context("Failed to list sessions")?;
    field("Found:", sessions.len());
    for session in sessions.iter().take(5) {
        println!("   - {} {}", session.id, truncate(&session.title, 40));
    }
    println!();

    step(2, "Creating a session...");
    let session = client
        .sessions()
        .create(CreateSessionRequest::new("Sessions Walkthrough").with_type(SessionType::Main))
        .await
        .context("Failed to create session")?;
    created.push(session.id.clone());
    success(format!("Created session {}", session.id));
    println!();

    step(3, "Fetching session details...");
    let detail = client
        .sessions()
        .get(&session.id)
        .await
        .context("Failed to get session")?;
    field("Title:", &detail.title);
    field("Created:", detail.created_at.to_rfc3339());
    if let Some(kind) = detail.session_type {
        field("Type:", kind);
    }
    println!();

    step(4, "Sending messages...");
    for (i, text) in PROMPTS.iter().enumerate() {
        println!("   [{}] {}", i + 1, text);
        if let Err(e) = client.messages().send(&session.id, *text).await {
            failure("send message", e);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    note("Messages are processed asynchronously");
    println!();

    step(5, "Retrieving session messages...");
    tokio::time::sleep(Duration::from_secs(args.wait)).await;
    let messages = client
        .messages()
        .list(&session.id)
        .await
        .context("Failed to list session messages")?;
    field("Messages:", messages.len());
    for (i, message) in messages.iter().take(5).enumerate() {
        println!(
            "   [{}] {}: {}",
            i + 1,
            message.role,
            truncate(message.display_content(), 50)
        );
    }
    println!();

    step(6, "Forking the session...");
    if messages.len() >= 2 {
        let fork = client
            .sessions()
            .fork(
                &session.id,
                ForkSessionRequest {
                    message_index: 1,
                    title: Some("Forked Session - Alternative Path".into()),
                },
            )
            .await
            .context("Failed to fork session")?;
        created.push(fork.id.clone());
        success(format!("Forked into {}", fork.id));
        field("Title:", &fork.title);
    } else {
        note("Not enough messages to fork yet");
    }
    println!();

    step(7, "Updating session callbacks...");
    let mut callback = Callback::new(CallbackType::BashScript);
    callback.name = Some("log-tool-runs".into());
    callback.event_type = Some("tool_execution_complete".into());
    callback.bash_script = Some("echo \"tool finished\"".into());
    match client
        .sessions()
        .update_callbacks(&session.id, vec![callback])
        .await
    {
        Ok(()) => success("Callbacks updated"),
        Err(e) => failure("update callbacks", e),
    }
    println!();

    step(8, "Exporting the session...");
    let export = client
        .sessions()
        .export(&session.id)
        .await
        .context("Failed to export session")?;
    field("ID:", &export.id);
    field("Title:", &export.title);
    field("Messages:", export.messages.len());
    field("Exported at:", chrono::Utc::now().to_rfc3339());
    println!();

    step(9, "Session statistics...");
    let refreshed = client
        .sessions()
        .get(&session.id)
        .await
        .context("Failed to get session")?;
    if let Some(count) = refreshed.user_message_count {
        field("User messages:", count);
    }
    if let Some(count) = refreshed.assistant_message_count {
        field("Assistant messages:", count);
    }
    if let Some(tokens) = export.total_tokens {
        field("Total tokens:", tokens);
    }
    if let Some(cost) = export.cost {
        field("Cost:", format!("${:.4}", cost));
    }
    println!();

    step(10, "Cancelling any in-flight processing...");
    match client.sessions().cancel(&session.id).await {
        Ok(()) => success("Cancel requested"),
        Err(e) => failure("cancel processing", e),
    }
    println!();

    step(11, "Rewinding the session...");
    match messages.first() {
        Some(first) if messages.len() > 1 => {
            match client.sessions().rewind(&session.id, first.id.as_str()).await {
                Ok(()) => success(format!("Messages after {} removed", first.id)),
                Err(e) => failure("rewind session", e),
            }
        }
        _ => note("Not enough messages to rewind"),
    }

    Ok(())
}
