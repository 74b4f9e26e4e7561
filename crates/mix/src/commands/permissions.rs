//! Permissions command - watch for and answer permission requests.

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use mix_client::{
    ConsumeOutcome, ContentData, CreateSessionRequest, ErrorData, EventHandler, MixClient,
    PermissionData, StreamOptions, ToolData, stream_while,
};
use tokio::sync::mpsc;

use super::{Context, banner, cleanup_sessions, failure, field, finished, note, step, success};

const PROMPT: &str =
    "Create a file named permissions_demo.txt containing the text 'hello from mix', then list the directory.";

/// Decision applied to every permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    /// Grant every request.
    Grant,
    /// Deny every request.
    Deny,
}

/// Arguments for the permissions command.
#[derive(Args, Debug)]
pub struct PermissionsArgs {
    /// Grant a single permission by ID and exit
    #[arg(long, conflicts_with = "deny")]
    pub grant: Option<String>,

    /// Deny a single permission by ID and exit
    #[arg(long)]
    pub deny: Option<String>,

    /// How to answer requests seen on the stream
    #[arg(long, value_enum, default_value_t = Decision::Grant)]
    pub auto: Decision,

    /// Message to send into the session
    #[arg(short, long, default_value = PROMPT)]
    pub message: String,

    /// Stream deadline in seconds (default: from config)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Run the permissions command.
pub async fn run(args: PermissionsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if let Some(id) = &args.grant {
        client
            .permissions()
            .grant(id)
            .await
            .with_context(|| format!("Failed to grant permission {}", id))?;
        success(format!("Granted {}", id));
        return Ok(());
    }
    if let Some(id) = &args.deny {
        client
            .permissions()
            .deny(id)
            .await
            .with_context(|| format!("Failed to deny permission {}", id))?;
        success(format!("Denied {}", id));
        return Ok(());
    }

    banner("Mix - Permissions Walkthrough");

    let mut created = Vec::new();
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or(ctx.stream_timeout);
    let result = walkthrough(&client, &args, ctx, timeout, &mut created).await;
    cleanup_sessions(&client, &created).await;
    result?;

    finished("Permissions");
    Ok(())
}

async fn walkthrough(
    client: &MixClient,
    args: &PermissionsArgs,
    ctx: &Context,
    timeout: Duration,
    created: &mut Vec<String>,
) -> Result<()> {
    step(1, "Creating a session...");
    let session = client
        .sessions()
        .create(CreateSessionRequest::new("Permissions Walkthrough"))
        .await
        .context("Failed to create session")?;
    created.push(session.id.clone());
    success(format!("Created session {}", session.id));
    println!();

    step(2, "Streaming events and answering permission requests...");
    field("Policy:", format!("{:?}", args.auto).to_lowercase());
    let (tx, rx) = mpsc::unbounded_channel();
    let responder = tokio::spawn(respond(client.clone(), rx, args.auto));

    let handler = PermissionWatcher {
        requests: tx,
        seen: 0,
    };
    let messages = client.messages();
    let run = stream_while(
        client,
        &session.id,
        StreamOptions::new().timeout(timeout),
        ctx.grace_period,
        handler,
        || messages.send(&session.id, args.message.as_str()),
    )
    .await?;

    let seen = run.handler.seen;
    // Closes the channel so the responder drains and exits.
    drop(run.handler);
    let answered = responder.await.unwrap_or(0);
    println!();

    step(3, "Results");
    match run.trigger {
        Some(Ok(())) => field("Message:", "sent"),
        Some(Err(e)) => failure("send message", e),
        None => note("Message not sent, the stream never opened"),
    }
    match run.stream {
        Ok(ConsumeOutcome::Completed) => success("Processing completed"),
        Ok(ConsumeOutcome::ServerError(e)) => failure("processing", e),
        Ok(ConsumeOutcome::Disconnected) => note("Server closed the stream early"),
        Ok(ConsumeOutcome::Cancelled) => note("Stream cancelled"),
        Err(e) => failure("stream", e),
    }
    field("Permission requests:", seen);
    field("Answered:", answered);
    if seen == 0 {
        note("No permissions were requested; the server may be configured to allow everything");
    }

    Ok(())
}

/// Answers each request as it arrives; returns how many succeeded.
async fn respond(
    client: MixClient,
    mut requests: mpsc::UnboundedReceiver<PermissionData>,
    decision: Decision,
) -> usize {
    let mut answered = 0;
    while let Some(request) = requests.recv().await {
        let result = match decision {
            Decision::Grant => client.permissions().grant(&request.id).await,
            Decision::Deny => client.permissions().deny(&request.id).await,
        };
        match result {
            Ok(()) => {
                answered += 1;
                note(format!("{:?} {}", decision, request.id));
            }
            Err(e) => failure(&format!("answer permission {}", request.id), e),
        }
    }
    answered
}

/// Forwards permission requests to the responder and echoes progress.
struct PermissionWatcher {
    requests: mpsc::UnboundedSender<PermissionData>,
    seen: usize,
}

impl EventHandler for PermissionWatcher {
    fn on_permission(&mut self, data: &PermissionData) {
        self.seen += 1;
        println!("   [permission] {} {}", data.id, data.summary());
        if let Some(tool) = &data.tool_name {
            field("  Tool:", tool);
        }
        if let Some(path) = &data.path {
            field("  Path:", path);
        }
        if self.requests.send(data.clone()).is_err() {
            tracing::warn!(id = %data.id, "Responder gone, permission left unanswered");
        }
    }

    fn on_tool(&mut self, data: &ToolData) {
        println!("   [tool] {}", data.name.as_deref().unwrap_or("unknown"));
    }

    fn on_content(&mut self, data: &ContentData) {
        print!("{}", data.content);
    }

    fn on_complete(&mut self) {
        println!();
        println!("   [complete]");
    }

    fn on_error(&mut self, data: &ErrorData) {
        println!();
        println!("   [error] {}", data.error);
    }
}
