//! HTTP/SSE client SDK for the Mix agent server.
//!
//! This crate provides a typed client for the Mix REST API and a consumer for
//! the per-session event stream.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use mix_client::{
//!     stream_while, ContentData, CreateSessionRequest, EventHandler, MixClient, Result,
//!     StreamOptions, DEFAULT_GRACE_PERIOD,
//! };
//!
//! struct Printer;
//!
//! impl EventHandler for Printer {
//!     fn on_content(&mut self, data: &ContentData) {
//!         print!("{}", data.content);
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let client = MixClient::builder()
//!     .base_url("http://localhost:8088")
//!     .build()?;
//!
//! let session = client.sessions().create(CreateSessionRequest::new("demo")).await?;
//!
//! let messages = client.messages();
//! let run = stream_while(
//!     &client,
//!     &session.id,
//!     StreamOptions::new().timeout(Duration::from_secs(60)),
//!     DEFAULT_GRACE_PERIOD,
//!     Printer,
//!     || messages.send(&session.id, "Hello!"),
//! )
//! .await?;
//! println!("\n{:?}", run.stream?);
//!
//! client.sessions().delete(&session.id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Sessions**: create, list, get, delete, fork, rewind, export, callbacks, cancel
//! - **Messages**: send, list, global history
//! - **Files**: upload, list, download (with thumbnails), delete
//! - **Authentication**: provider status, API keys, OAuth flows
//! - **Preferences**: get, partial update, reset
//! - **Permissions**: grant and deny
//! - **Tools**: LLM tools, status, credentials
//! - **System**: health, commands, MCP servers
//! - **Streaming**: session event stream with typed events

pub mod api;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod session;
pub mod stream;
pub mod types;

pub use api::StreamOptions;
pub use client::{ClientBuilder, MixClient, DEFAULT_BASE_URL};
pub use dispatch::{consume, dispatch, ConsumeOutcome, EventHandler, Flow};
pub use error::{Error, Result};
pub use events::*;
pub use session::{stream_while, StreamRun, DEFAULT_GRACE_PERIOD};
pub use stream::EventStream;
pub use tokio_util::sync::CancellationToken;
pub use types::*;
