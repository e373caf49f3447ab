use crate::shared::core::trace_context::TraceContext;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode {event_type}: {source}")]
    Encode {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("broker rejected message on {topic}: {reason}")]
    Rejected { topic: String, reason: String },

    #[error("broker unreachable: {0}")]
    Unreachable(String),
}

/// CloudEvents 1.0 envelope as published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent<TData> {
    pub specversion: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub id: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceparent: Option<String>,
    pub data: TData,
}

impl<TData> CloudEvent<TData> {
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        id: impl Into<String>,
        data: TData,
        trace: Option<&TraceContext>,
    ) -> Self {
        Self {
            specversion: "1.0".to_string(),
            event_type: event_type.into(),
            source: source.into(),
            id: id.into(),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            traceparent: trace.and_then(TraceContext::to_traceparent),
            data,
        }
    }
}

/// One message ready for the broker: `payload` is the encoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub message_id: String,
    pub key: String,
    pub event_type: String,
    pub payload: String,
}

impl OutboundMessage {
    pub fn from_cloud_event<TData>(key: impl Into<String>, event: &CloudEvent<TData>) -> Result<Self, PublishError>
    where
        TData: Serialize,
    {
        let payload = serde_json::to_string(event).map_err(|source| PublishError::Encode {
            event_type: event.event_type.clone(),
            source,
        })?;
        Ok(Self {
            message_id: event.id.clone(),
            key: key.into(),
            event_type: event.event_type.clone(),
            payload,
        })
    }
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<(), PublishError>;
}

pub mod in_memory;
pub mod pulsar;
