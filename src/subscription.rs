//! New-block notifications
//!
//! The full node has no push channel, so a background task polls the head
//! block and emits an event whenever the height moves. The task lives
//! exactly as long as its [`BlockSubscription`] handle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ChainReader;

/// A new head block was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEvent {
    pub number: u64,
}

/// Owner of the polling task. Dropping it stops the task.
pub struct BlockSubscription {
    cancellation_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl BlockSubscription {
    /// Start polling `reader` every `poll_interval`, sending each height
    /// increase on `sender`
    pub fn spawn(
        reader: Arc<dyn ChainReader>,
        poll_interval: Duration,
        sender: mpsc::UnboundedSender<BlockEvent>,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_seen: Option<u64> = None;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        match reader.latest_block().await {
                            Ok(number) if last_seen.map_or(true, |last| number > last) => {
                                last_seen = Some(number);
                                debug!(block = number, "new block");
                                if sender.send(BlockEvent { number }).is_err() {
                                    break;
                                }
                            }
                            Ok(_) => {}
                            Err(e) => warn!(error = %e, "block poll failed"),
                        }
                    }
                }
            }
            debug!("block subscription stopped");
        });

        Self {
            cancellation_token,
            handle: Some(handle),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop polling and wait for the task to finish
    pub async fn unsubscribe(mut self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for BlockSubscription {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
