use crate::modules::products::core::events::{
    ProductCreatedEvent, ProductDeletedEvent, ProductUpdatedEvent,
};
use crate::modules::products::core::ports::{ProductEventPublisher, PublishContext};
use crate::shared::infrastructure::event_bus::PublishError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum PublishedProductEvent {
    Created(ProductCreatedEvent),
    Updated(ProductUpdatedEvent),
    Deleted(ProductDeletedEvent),
}

/// Records every publication instead of sending it.
#[derive(Default)]
pub struct RecordingProductEventPublisher {
    published: Mutex<Vec<(PublishedProductEvent, PublishContext)>>,
    offline: AtomicBool,
}

impl RecordingProductEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub async fn published(&self) -> Vec<(PublishedProductEvent, PublishContext)> {
        self.published.lock().await.clone()
    }

    async fn record(
        &self,
        event: PublishedProductEvent,
        context: PublishContext,
    ) -> Result<(), PublishError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PublishError::Unreachable("publisher offline".into()));
        }
        self.published.lock().await.push((event, context));
        Ok(())
    }
}

#[async_trait]
impl ProductEventPublisher for RecordingProductEventPublisher {
    async fn publish_product_created(
        &self,
        event: ProductCreatedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError> {
        self.record(PublishedProductEvent::Created(event), context).await
    }

    async fn publish_product_updated(
        &self,
        event: ProductUpdatedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError> {
        self.record(PublishedProductEvent::Updated(event), context).await
    }

    async fn publish_product_deleted(
        &self,
        event: ProductDeletedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError> {
        self.record(PublishedProductEvent::Deleted(event), context).await
    }
}
