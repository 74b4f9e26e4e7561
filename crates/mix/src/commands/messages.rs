//! Messages command - conversation history and message metadata.

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use mix_client::{CreateSessionRequest, HistoryQuery, Message, MixClient};

use super::{
    Context, banner, cleanup_sessions, failure, field, finished, note, step, success, truncate,
};

const CONVERSATION: &[&str] = &[
    "Hello! Can you introduce yourself?",
    "What can you help me with?",
    "Can you explain what the Fibonacci sequence is?",
];

/// Arguments for the messages command.
#[derive(Args, Debug)]
pub struct MessagesArgs {
    /// Seconds to wait for the server to process messages
    #[arg(long, default_value_t = 3)]
    pub wait: u64,

    /// Page size for the pagination step
    #[arg(long, default_value_t = 2)]
    pub page_size: u32,
}

/// Run the messages command.
pub async fn run(args: MessagesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    banner("Mix - Messages Walkthrough");

    let mut created = Vec::new();
    let result = walkthrough(&client, &args, &mut created).await;
    cleanup_sessions(&client, &created).await;
    result?;

    finished("Messages");
    Ok(())
}

async fn walkthrough(
    client: &MixClient,
    args: &MessagesArgs,
    created: &mut Vec<String>,
) -> Result<()> {
    step(1, "Retrieving global message history...");
    let history = client
        .messages()
        .history(HistoryQuery {
            limit: Some(10),
            offset: None,
        })
        .await
        .context("Failed to get message history")?;
    field("Found:", history.len());
    print_brief(&history, 3, 60);
    println!();

    step(2, "Creating a session...");
    let session = client
        .sessions()
        .create(CreateSessionRequest::new(
            "Messages Walkthrough - Interactive Conversation",
        ))
        .await
        .context("Failed to create session")?;
    created.push(session.id.clone());
    success(format!("Created session {}", session.id));
    println!();

    step(3, "Building a conversation...");
    for (i, text) in CONVERSATION.iter().enumerate() {
        println!("   [{}] User: {}", i + 1, text);
        match client.messages().send(&session.id, *text).await {
            Ok(()) => note("sent"),
            Err(e) => failure("send message", e),
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    println!();

    step(4, "Waiting for processing...");
    tokio::time::sleep(Duration::from_secs(args.wait)).await;
    let messages = client
        .messages()
        .list(&session.id)
        .await
        .context("Failed to list session messages")?;
    println!();

    step(5, "Conversation with metadata:");
    field("Total messages:", messages.len());
    println!();
    for (i, message) in messages.iter().enumerate() {
        println!("   Message {} [{}]", i + 1, message.role);
        field("ID:", &message.id);
        field("Content:", truncate(message.display_content(), 100));
        if let Some(duration) = message.reasoning_duration {
            field("Reasoning duration:", format!("{}ms", duration));
        }
        if let Some(reasoning) = &message.reasoning {
            field("Reasoning:", truncate(reasoning, 100));
        }
        if message.has_tool_calls() {
            field("Tool calls:", message.tool_calls.len());
            for (j, call) in message.tool_calls.iter().enumerate() {
                println!("     [{}] {}", j + 1, call.name);
            }
        }
        println!();
    }

    step(6, "Paging through history...");
    for page in 0..2 {
        let query = HistoryQuery {
            limit: Some(args.page_size),
            offset: Some(page * args.page_size),
        };
        match client.messages().history(query).await {
            Ok(batch) => {
                field(&format!("Page {}:", page + 1), format!("{} message(s)", batch.len()));
                print_brief(&batch, batch.len(), 50);
            }
            Err(e) => failure("page history", e),
        }
    }
    println!();

    step(7, "Sending a message that may use a tool...");
    let tool_prompt = "What's the current weather in San Francisco? Use a tool if available.";
    println!("   User: {}", tool_prompt);
    match client.messages().send(&session.id, tool_prompt).await {
        Ok(()) => note("Message sent"),
        Err(e) => failure("send message", e),
    }
    println!();

    step(8, "Message statistics...");
    tokio::time::sleep(Duration::from_secs(args.wait)).await;
    let all = client
        .messages()
        .list(&session.id)
        .await
        .context("Failed to list session messages")?;
    let stats = Stats::from_messages(&all);
    field("Total:", all.len());
    field("User:", stats.user);
    field("Assistant:", stats.assistant);
    field("With tool calls:", stats.with_tools);
    println!();

    step(9, "Testing conversation continuity...");
    let follow_up =
        "Based on what we discussed earlier, can you remind me what the Fibonacci sequence is?";
    println!("   User: {}", follow_up);
    match client.messages().send(&session.id, follow_up).await {
        Ok(()) => note("Message sent - the reply will use the conversation so far"),
        Err(e) => failure("send message", e),
    }

    Ok(())
}

fn print_brief(messages: &[Message], limit: usize, width: usize) {
    for (i, message) in messages.iter().take(limit).enumerate() {
        println!(
            "   [{}] {}: {}",
            i + 1,
            message.role,
            truncate(message.display_content(), width)
        );
    }
}

/// Message counts by role.
#[derive(Debug, Default, PartialEq)]
struct Stats {
    user: usize,
    assistant: usize,
    with_tools: usize,
}

impl Stats {
    fn from_messages(messages: &[Message]) -> Self {
        let mut stats = Self::default();
        for message in messages {
            match message.role.as_str() {
                "user" => stats.user += 1,
                "assistant" => stats.assistant += 1,
                _ => {}
            }
            if message.has_tool_calls() {
                stats.with_tools += 1;
            }
        }
        stats
    }
}
