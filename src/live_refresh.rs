use crate::ports::RegistryEventSource;
use crate::types::RegistryEvent;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Follows `StudentAdded` / `StudentRemoved` by polling contract logs.
///
/// Events are hints to re-read; nothing here mutates directory state.
pub struct LiveRefresh<P> {
    source: Arc<P>,
    cursor: Option<u64>,
}

impl<P> LiveRefresh<P>
where
    P: RegistryEventSource + Send + Sync,
{
    #[must_use]
    pub const fn new(source: Arc<P>) -> Self {
        Self {
            source,
            cursor: None,
        }
    }

    /// Next block to be scanned, once started.
    #[must_use]
    pub const fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Anchors the cursor just past the current head so history is skipped.
    ///
    /// # Errors
    /// Propagates the head lookup fault.
    pub async fn start(&mut self) -> Result<u64> {
        let head = self.source.latest_block().await?;
        let from = head.saturating_add(1);
        self.cursor = Some(from);
        tracing::debug!(from_block = from, "live refresh anchored");
        Ok(from)
    }

    /// Fetches events since the cursor and advances it.
    ///
    /// # Errors
    /// Propagates the log query fault; the cursor is left in place.
    pub async fn poll(&mut self) -> Result<Vec<RegistryEvent>> {
        let from = match self.cursor {
            Some(from) => from,
            None => self.start().await?,
        };
        let batch = self.source.events_since(from).await?;
        self.cursor = Some(batch.next_block.max(from));
        if !batch.events.is_empty() {
            tracing::info!(count = batch.events.len(), from_block = from, "registry events observed");
        }
        Ok(batch.events)
    }

    /// Polls every `period` until `shutdown` resolves, handing each event to
    /// `on_event`. Poll faults are logged and retried on the next tick.
    ///
    /// # Errors
    /// Fails only when the initial anchor cannot be read.
    pub async fn run<F, S>(&mut self, period: Duration, shutdown: S, mut on_event: F) -> Result<()>
    where
        F: FnMut(RegistryEvent) + Send,
        S: Future<Output = ()> + Send,
    {
        if self.cursor.is_none() {
            self.start().await?;
        }

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::debug!("live refresh stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.poll().await {
                        Ok(events) => events.into_iter().for_each(&mut on_event),
                        Err(err) => tracing::warn!(error = %err, "polling registry events failed"),
                    }
                }
            }
        }
    }
}
