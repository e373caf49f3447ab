use crate::shared::infrastructure::event_bus::{EventBus, OutboundMessage, PublishError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PulsarProducerMessageProperties {
    message_id: String,
    event_type: String,
    timestamp: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PulsarProducerMessage {
    payload: String,
    key: Option<String>,
    properties: Option<PulsarProducerMessageProperties>,
    context: Option<String>,
    replication_clusters: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PulsarProducerBody {
    producer_name: String,
    messages: Vec<PulsarProducerMessage>,
}

/// Publishes through the Pulsar REST producer API.
#[derive(Debug, Clone)]
pub struct PulsarEventBus {
    client: Client,
    producer_name: String,
    broker_url: String,
    tenant: String,
    namespace: String,
}

impl PulsarEventBus {
    pub fn new(
        producer_name: impl Into<String>,
        broker_url: impl Into<String>,
        tenant: impl Into<String>,
        namespace: impl Into<String>,
    ) -> PulsarEventBus {
        PulsarEventBus {
            client: Client::new(),
            producer_name: producer_name.into(),
            broker_url: broker_url.into().trim_end_matches('/').to_string(),
            tenant: tenant.into(),
            namespace: namespace.into(),
        }
    }

    fn topic_url(&self, topic: &str) -> String {
        format!(
            "{}/topics/persistent/{}/{}/{}",
            self.broker_url, self.tenant, self.namespace, topic
        )
    }

    fn body(&self, message: OutboundMessage) -> PulsarProducerBody {
        let properties = PulsarProducerMessageProperties {
            message_id: message.message_id.clone(),
            event_type: message.event_type,
            timestamp: Utc::now().timestamp_millis(),
        };
        PulsarProducerBody {
            producer_name: self.producer_name.clone(),
            messages: vec![PulsarProducerMessage {
                payload: message.payload,
                key: Some(message.key),
                properties: Some(properties),
                context: Some(message.message_id),
                replication_clusters: None,
            }],
        }
    }
}

#[async_trait]
impl EventBus for PulsarEventBus {
    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<(), PublishError> {
        let response = self
            .client
            .post(self.topic_url(topic))
            .json(&self.body(message))
            .send()
            .await
            .map_err(|err| PublishError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
                reason: format!("{status}: {reason}"),
            });
        }
        Ok(())
    }
}
