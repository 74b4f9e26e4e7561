//! Stream command - live session events while a message is processed.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;
use mix_client::{
    ConnectedData, ConsumeOutcome, ContentData, CreateSessionRequest, ErrorData, EventHandler,
    MixClient, PermissionData, SessionEventData, StreamOptions, StreamRun, ThinkingData, ToolData,
    ToolExecutionData, UserMessageData, stream_while,
};
use serde_json::Value;

use super::{Context, banner, cleanup_sessions, failure, field, finished, note, step, success, truncate};

const DEFAULT_PROMPT: &str =
    "Explain the concept of recursion in programming with a simple example.";

/// Arguments for the stream command.
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Message that triggers processing
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    pub message: String,

    /// Use an existing session (kept afterwards) instead of a new one
    #[arg(long)]
    pub session: Option<String>,

    /// Stream deadline in seconds (default: from config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Milliseconds to wait for the stream before sending (default: from config)
    #[arg(long)]
    pub grace_ms: Option<u64>,

    /// Resume after this event ID
    #[arg(long)]
    pub last_event_id: Option<String>,

    /// Only print assistant text as it arrives
    #[arg(long)]
    pub simple: bool,
}

/// Run the stream command.
pub async fn run(args: StreamArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    if !args.simple {
        banner("Mix - Streaming Walkthrough");
    }

    let mut created = Vec::new();
    let result = walkthrough(&client, &args, ctx, &mut created).await;
    cleanup_sessions(&client, &created).await;
    result?;

    if !args.simple {
        finished("Streaming");
    }
    Ok(())
}

async fn walkthrough(
    client: &MixClient,
    args: &StreamArgs,
    ctx: &Context,
    created: &mut Vec<String>,
) -> Result<()> {
    let session_id = match &args.session {
        Some(id) => id.clone(),
        None => {
            let session = client
                .sessions()
                .create(CreateSessionRequest::new("Streaming Walkthrough"))
                .await
                .context("Failed to create session")?;
            created.push(session.id.clone());
            session.id
        }
    };

    let mut options = StreamOptions::new().timeout(
        args.timeout
            .map(Duration::from_secs)
            .unwrap_or(ctx.stream_timeout),
    );
    if let Some(id) = &args.last_event_id {
        options = options.last_event_id(id);
    }
    let grace = args
        .grace_ms
        .map(Duration::from_millis)
        .unwrap_or(ctx.grace_period);

    if args.simple {
        let run = start(client, &session_id, options, grace, &args.message, Simple).await?;
        println!();
        return report_errors(run);
    }

    step(1, "Session");
    field("ID:", &session_id);
    if args.session.is_some() {
        note("Existing session, it will not be deleted");
    }
    println!();

    step(2, "Streaming...");
    field("Message:", truncate(&args.message, 80));
    println!();
    let started = Instant::now();
    let run = start(
        client,
        &session_id,
        options,
        grace,
        &args.message,
        Verbose::default(),
    )
    .await?;
    println!();

    step(3, "Results");
    let counts = &run.handler;
    field("Elapsed:", format!("{:.1}s", started.elapsed().as_secs_f64()));
    field("Events:", counts.events);
    field("Content chunks:", counts.chunks);
    field("Tool calls:", counts.tools);
    field("Heartbeats:", counts.heartbeats);
    report_errors(run)
}

async fn start<H>(
    client: &MixClient,
    session_id: &str,
    options: StreamOptions,
    grace: Duration,
    message: &str,
    handler: H,
) -> Result<StreamRun<H, ()>>
where
    H: EventHandler + Send + 'static,
{
    let messages = client.messages();
    let run = stream_while(client, session_id, options, grace, handler, || {
        messages.send(session_id, message)
    })
    .await?;
    Ok(run)
}

/// Print the trigger and stream results; fails if either did.
fn report_errors<H>(run: StreamRun<H, ()>) -> Result<()> {
    let mut failed = false;
    match run.trigger {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            failure("send message", e);
            failed = true;
        }
        None => note("Message not sent, the stream never opened"),
    }
    match run.stream {
        Ok(ConsumeOutcome::Completed) => success("Stream completed"),
        Ok(ConsumeOutcome::ServerError(e)) => {
            failure("processing", e);
            failed = true;
        }
        Ok(ConsumeOutcome::Disconnected) => note("Server closed the stream without completing"),
        Ok(ConsumeOutcome::Cancelled) => note("Stream cancelled"),
        Err(e) if e.is_timeout() => {
            failure("stream", e);
            failed = true;
        }
        Err(e) => return Err(e).context("Stream failed"),
    }
    if failed {
        anyhow::bail!("Streaming did not finish cleanly");
    }
    Ok(())
}

/// Prints only assistant text.
struct Simple;

impl EventHandler for Simple {
    fn on_content(&mut self, data: &ContentData) {
        print!("{}", data.content);
        let _ = std::io::stdout().flush();
    }

    fn on_complete(&mut self) {
        println!();
    }

    fn on_error(&mut self, data: &ErrorData) {
        eprintln!();
        eprintln!("{} {}", Style::new().red().apply_to("Error:"), data.error);
    }
}

/// Prints every event with a label and keeps counts.
#[derive(Debug, Default)]
struct Verbose {
    events: usize,
    chunks: usize,
    tools: usize,
    heartbeats: usize,
}

fn label(name: &str) -> String {
    Style::new().cyan().apply_to(format!("[{}]", name)).to_string()
}

impl EventHandler for Verbose {
    fn on_connected(&mut self, data: &ConnectedData) {
        self.events += 1;
        println!(
            "   {} {}",
            label("connected"),
            data.session_id.as_deref().unwrap_or("")
        );
    }

    fn on_thinking(&mut self, data: &ThinkingData) {
        self.events += 1;
        match &data.content {
            Some(text) => println!("   {} {}", label("thinking"), truncate(text, 100)),
            None => println!("   {}", label("thinking")),
        }
    }

    fn on_content(&mut self, data: &ContentData) {
        self.events += 1;
        self.chunks += 1;
        println!("   {} {}", label("content"), truncate(&data.content, 100));
    }

    fn on_tool(&mut self, data: &ToolData) {
        self.events += 1;
        self.tools += 1;
        println!(
            "   {} {} {}",
            label("tool"),
            data.name.as_deref().unwrap_or("?"),
            data.status.as_deref().unwrap_or("")
        );
        if let Some(input) = &data.input {
            note(truncate(&input.to_string(), 100));
        }
    }

    fn on_tool_execution_start(&mut self, data: &ToolExecutionData) {
        self.events += 1;
        println!(
            "   {} {} ({})",
            label("tool_execution_start"),
            data.name.as_deref().unwrap_or("?"),
            data.id
        );
    }

    fn on_tool_execution_complete(&mut self, data: &ToolExecutionData) {
        self.events += 1;
        println!(
            "   {} {} {}",
            label("tool_execution_complete"),
            data.name.as_deref().unwrap_or("?"),
            data.status.as_deref().unwrap_or("")
        );
    }

    fn on_permission(&mut self, data: &PermissionData) {
        self.events += 1;
        println!("   {} {} {}", label("permission"), data.id, data.summary());
        note(format!("Answer with `mix permissions --grant {}`", data.id));
    }

    fn on_user_message_created(&mut self, data: &UserMessageData) {
        self.events += 1;
        println!(
            "   {} {}",
            label("user_message_created"),
            truncate(data.content.as_deref().unwrap_or(""), 100)
        );
    }

    fn on_session_created(&mut self, data: &SessionEventData) {
        self.events += 1;
        println!("   {} {}", label("session_created"), data.session_id);
    }

    fn on_session_deleted(&mut self, data: &SessionEventData) {
        self.events += 1;
        println!("   {} {}", label("session_deleted"), data.session_id);
    }

    fn on_complete(&mut self) {
        self.events += 1;
        println!("   {}", label("complete"));
    }

    fn on_error(&mut self, data: &ErrorData) {
        self.events += 1;
        println!("   {} {}", label("error"), data.error);
    }

    fn on_heartbeat(&mut self) {
        self.events += 1;
        self.heartbeats += 1;
    }

    fn on_unknown(&mut self, event_type: &str, raw: &Value) {
        self.events += 1;
        println!(
            "   {} {}",
            label(event_type),
            truncate(&raw.to_string(), 100)
        );
    }
}
