// Publishes product events on the message bus as CloudEvents.
//
// The envelope id is the outbox entry id and the partition key is the product
// id, so all events of one product stay ordered on their topic.

use crate::modules::products::core::events::{
    PRODUCT_CREATED, PRODUCT_DELETED, PRODUCT_UPDATED, ProductCreatedEvent, ProductDeletedEvent,
    ProductUpdatedEvent,
};
use crate::modules::products::core::ports::{ProductEventPublisher, PublishContext};
use crate::shared::infrastructure::event_bus::{CloudEvent, EventBus, OutboundMessage, PublishError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTopics {
    pub created: String,
    pub updated: String,
    pub deleted: String,
}

impl Default for ProductTopics {
    fn default() -> Self {
        Self {
            created: "product-created".into(),
            updated: "product-updated".into(),
            deleted: "product-deleted".into(),
        }
    }
}

pub struct BusProductEventPublisher<TBus>
where
    TBus: EventBus + ?Sized,
{
    bus: Arc<TBus>,
    source: String,
    topics: ProductTopics,
}

impl<TBus> BusProductEventPublisher<TBus>
where
    TBus: EventBus + ?Sized,
{
    /// `environment` prefixes the CloudEvent source, e.g. `prod.products`.
    pub fn new(bus: Arc<TBus>, environment: &str, topics: ProductTopics) -> Self {
        Self {
            bus,
            source: format!("{environment}.products"),
            topics,
        }
    }

    async fn send<TData>(
        &self,
        topic: &str,
        event_type: &str,
        product_id: &str,
        data: TData,
        context: PublishContext,
    ) -> Result<(), PublishError>
    where
        TData: Serialize + Send,
    {
        let envelope = CloudEvent::new(
            event_type,
            self.source.as_str(),
            context.message_id,
            data,
            context.link.as_ref(),
        );
        let message = OutboundMessage::from_cloud_event(product_id, &envelope)?;
        self.bus.publish(topic, message).await?;
        tracing::debug!(topic, event_type, product_id, "event published");
        Ok(())
    }
}

#[async_trait]
impl<TBus> ProductEventPublisher for BusProductEventPublisher<TBus>
where
    TBus: EventBus + ?Sized,
{
    async fn publish_product_created(
        &self,
        event: ProductCreatedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError> {
        let product_id = event.product_id.clone();
        self.send(&self.topics.created, PRODUCT_CREATED, &product_id, event, context)
            .await
    }

    async fn publish_product_updated(
        &self,
        event: ProductUpdatedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError> {
        let product_id = event.product_id.clone();
        self.send(&self.topics.updated, PRODUCT_UPDATED, &product_id, event, context)
            .await
    }

    async fn publish_product_deleted(
        &self,
        event: ProductDeletedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError> {
        let product_id = event.product_id.clone();
        self.send(&self.topics.deleted, PRODUCT_DELETED, &product_id, event, context)
            .await
    }
}
