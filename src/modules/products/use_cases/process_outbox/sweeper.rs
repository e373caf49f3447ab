// Publishes pending outbox entries.
//
// Purpose
// - Turn committed outbox rows into bus messages, eventually, once each.
//
// Responsibilities
// - Fetch unprocessed entries oldest first.
// - Dispatch each entry through the event handler registry and mark it
//   processed only after the publish succeeded.
// - Isolate failures: a failing entry is logged and left for the next run.
// - Run each entry inside a span linked to the request that created it.
//
// Delivery is at least once. Entries are not claimed, so concurrent sweepers
// may publish the same entry twice; the envelope id is the entry id.

use crate::modules::products::core::ports::PublishContext;
use crate::modules::products::use_cases::process_outbox::registry::EventHandlerRegistry;
use crate::shared::infrastructure::database::StoreError;
use crate::shared::infrastructure::event_bus::PublishError;
use crate::shared::infrastructure::outbox::{OutboxEntry, OutboxRepository};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("no handler registered for event type {0}")]
    UnknownEventType(String),

    #[error("failed to deserialize {event_type} payload: {source}")]
    Deserialize {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("published but not marked processed: {0}")]
    MarkProcessed(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub processed: Vec<String>,
    pub failed: Vec<String>,
}

pub struct OutboxSweeper<TOutbox, TPublisher>
where
    TOutbox: OutboxRepository + ?Sized,
    TPublisher: ?Sized,
{
    outbox: Arc<TOutbox>,
    publisher: Arc<TPublisher>,
    registry: EventHandlerRegistry<TPublisher>,
}

impl<TOutbox, TPublisher> OutboxSweeper<TOutbox, TPublisher>
where
    TOutbox: OutboxRepository + ?Sized,
    TPublisher: ?Sized + Send + Sync + 'static,
{
    pub fn new(
        outbox: Arc<TOutbox>,
        publisher: Arc<TPublisher>,
        registry: EventHandlerRegistry<TPublisher>,
    ) -> Self {
        Self {
            outbox,
            publisher,
            registry,
        }
    }

    /// One sweep. Only failing to read the outbox fails the run; entry
    /// failures are reported in the `SweepReport`.
    pub async fn run(&self) -> Result<SweepReport, StoreError> {
        let entries = self.outbox.get_unprocessed_entries().await?;
        tracing::debug!(pending = entries.len(), "outbox sweep started");

        let mut report = SweepReport::default();
        for entry in entries {
            if entry.is_processed() {
                continue;
            }
            let span = tracing::info_span!(
                "outbox.process_entry",
                outbox.entry_id = %entry.id,
                outbox.event_type = %entry.event_type,
                outbox.original_trace_id = %entry.trace_id,
                outbox.original_span_id = %entry.span_id,
            );
            match self.process_entry(&entry).instrument(span.clone()).await {
                Ok(()) => report.processed.push(entry.id),
                Err(err) => {
                    span.in_scope(|| {
                        tracing::error!(error = %err, "failed to process outbox entry");
                    });
                    report.failed.push(entry.id);
                }
            }
        }

        if !report.processed.is_empty() || !report.failed.is_empty() {
            tracing::info!(
                processed = report.processed.len(),
                failed = report.failed.len(),
                "outbox sweep finished"
            );
        }
        Ok(report)
    }

    async fn process_entry(&self, entry: &OutboxEntry) -> Result<(), EntryError> {
        let context = PublishContext {
            message_id: entry.id.clone(),
            link: entry.trace_context(),
        };
        let publish = self.registry.dispatch(
            self.publisher.clone(),
            &entry.event_type,
            &entry.event_data,
            context,
        )?;
        publish.await?;
        self.outbox.mark_as_processed(&entry.id).await?;
        tracing::debug!("outbox entry published");
        Ok(())
    }
}
