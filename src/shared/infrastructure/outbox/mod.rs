use crate::shared::core::trace_context::TraceContext;
use crate::shared::infrastructure::database::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Durable record of an event waiting to be published. Written in the same
/// transaction as the state change it describes; `processed_at` is set once,
/// when publication succeeded, and entries are never deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxEntry {
    pub id: String,
    pub event_type: String,
    pub event_data: String,
    pub trace_id: String,
    pub span_id: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("failed to serialize {event_type} payload: {source}")]
    Serialization {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

impl OutboxEntry {
    pub fn new<TEvent>(
        event_type: &str,
        event: &TEvent,
        trace: Option<&TraceContext>,
    ) -> Result<Self, OutboxError>
    where
        TEvent: Serialize,
    {
        let event_data =
            serde_json::to_string(event).map_err(|source| OutboxError::Serialization {
                event_type: event_type.to_string(),
                source,
            })?;
        let trace = trace.cloned().unwrap_or_default();
        Ok(Self {
            id: Uuid::now_v7().to_string(),
            event_type: event_type.to_string(),
            event_data,
            trace_id: trace.trace_id,
            span_id: trace.span_id,
            created_at: Utc::now(),
            processed_at: None,
        })
    }

    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }

    /// The originating trace, if the entry was created under one.
    pub fn trace_context(&self) -> Option<TraceContext> {
        let context = TraceContext::new(self.trace_id.clone(), self.span_id.clone());
        (!context.is_empty()).then_some(context)
    }
}

/// Read and acknowledge side of the outbox, used by the sweeper.
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Entries with no `processed_at`, oldest first.
    async fn get_unprocessed_entries(&self) -> Result<Vec<OutboxEntry>, StoreError>;

    /// Sets `processed_at` on one unprocessed entry. Already processed entries
    /// keep their original timestamp.
    async fn mark_as_processed(&self, entry_id: &str) -> Result<(), StoreError>;
}
