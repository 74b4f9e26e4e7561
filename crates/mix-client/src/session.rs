//! Stream-then-trigger orchestration.
//!
//! Most server work is kicked off by one request (usually sending a message)
//! and reported on the session's event stream. The stream has to be open
//! before the work starts or early events are missed, so [`stream_while`]
//! opens and consumes the stream on its own task and fires the trigger once
//! the stream is up or a grace period has passed, whichever comes first.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::api::StreamOptions;
use crate::client::MixClient;
use crate::dispatch::{consume, ConsumeOutcome, EventHandler};
use crate::error::{Error, Result};

/// Default wait between starting the stream and firing the trigger.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Result of [`stream_while`].
///
/// The stream and the trigger report separately; either can fail alone.
#[derive(Debug)]
pub struct StreamRun<H, T> {
    /// The handler, returned once the stream has ended.
    pub handler: H,
    /// How the stream ended.
    pub stream: Result<ConsumeOutcome>,
    /// The trigger's result; `None` when the stream never opened and the
    /// trigger was skipped.
    pub trigger: Option<Result<T>>,
}

/// Consume a session's events while `trigger` runs.
///
/// If the trigger fails the stream is cancelled, since nothing will arrive on
/// it. A cancellation token in `options` is honored as a parent.
pub async fn stream_while<H, F, Fut, T>(
    client: &MixClient,
    session_id: &str,
    options: StreamOptions,
    grace: Duration,
    handler: H,
    trigger: F,
) -> Result<StreamRun<H, T>>
where
    H: EventHandler + Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let cancel = match &options.cancel {
        Some(parent) => parent.child_token(),
        None => CancellationToken::new(),
    };
    let options = options.cancel_token(cancel.clone());
    let streaming = client.streaming();
    let id = session_id.to_string();
    let (ready_tx, ready_rx) = oneshot::channel();

    let consumer = tokio::spawn(async move {
        let mut handler = handler;
        let mut stream = match streaming.open(&id, options).await {
            Ok(stream) => stream,
            Err(e) => return (handler, Err(e)),
        };
        let _ = ready_tx.send(());
        let outcome = consume(&mut stream, &mut handler).await;
        (handler, outcome)
    });

    let trigger_result = match tokio::time::timeout(grace, ready_rx).await {
        // The sender was dropped: open failed, the trigger would go unobserved.
        Ok(Err(_)) => None,
        Ok(Ok(())) | Err(_) => {
            tracing::debug!(session_id, "Firing trigger");
            let result = trigger().await;
            if let Err(e) = &result {
                tracing::warn!(session_id, error = %e, "Trigger failed, cancelling stream");
                cancel.cancel();
            }
            Some(result)
        }
    };

    let (handler, stream_result) = consumer
        .await
        .map_err(|e| Error::Stream(format!("consumer task failed: {}", e)))?;

    Ok(StreamRun {
        handler,
        stream: stream_result,
        trigger: trigger_result,
    })
}
