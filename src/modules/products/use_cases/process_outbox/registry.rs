// Dispatch table from an outbox event type to the publisher call for it.
//
// Each registration owns the decoding of its payload, so supporting a new
// event type is one `register` call and the sweeper never branches on tags.

use crate::modules::products::core::events::{
    PRODUCT_CREATED, PRODUCT_DELETED, PRODUCT_UPDATED, ProductCreatedEvent, ProductDeletedEvent,
    ProductUpdatedEvent,
};
use crate::modules::products::core::ports::{ProductEventPublisher, PublishContext};
use crate::modules::products::use_cases::process_outbox::sweeper::EntryError;
use crate::shared::infrastructure::event_bus::PublishError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type PublishFuture = Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send>>;

type EventHandler<TPublisher> = Box<
    dyn Fn(Arc<TPublisher>, &str, PublishContext) -> Result<PublishFuture, EntryError>
        + Send
        + Sync,
>;

pub struct EventHandlerRegistry<TPublisher>
where
    TPublisher: ?Sized,
{
    handlers: HashMap<String, EventHandler<TPublisher>>,
}

impl<TPublisher> Default for EventHandlerRegistry<TPublisher>
where
    TPublisher: ?Sized + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<TPublisher> EventHandlerRegistry<TPublisher>
where
    TPublisher: ?Sized + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<TEvent, THandler, TFuture>(
        &mut self,
        event_type: &str,
        handler: THandler,
    ) -> &mut Self
    where
        TEvent: DeserializeOwned + Send + 'static,
        THandler: Fn(Arc<TPublisher>, TEvent, PublishContext) -> TFuture + Send + Sync + 'static,
        TFuture: Future<Output = Result<(), PublishError>> + Send + 'static,
    {
        let tag = event_type.to_string();
        self.handlers.insert(
            event_type.to_string(),
            Box::new(move |publisher: Arc<TPublisher>, event_data: &str, context: PublishContext| {
                let event: TEvent =
                    serde_json::from_str(event_data).map_err(|source| EntryError::Deserialize {
                        event_type: tag.clone(),
                        source,
                    })?;
                Ok(Box::pin(handler(publisher, event, context)) as PublishFuture)
            }),
        );
        self
    }

    pub fn is_registered(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Decodes `event_data` for `event_type` and returns the pending publish.
    /// Nothing is sent until the returned future is awaited.
    pub fn dispatch(
        &self,
        publisher: Arc<TPublisher>,
        event_type: &str,
        event_data: &str,
        context: PublishContext,
    ) -> Result<PublishFuture, EntryError> {
        let handler = self
            .handlers
            .get(event_type)
            .ok_or_else(|| EntryError::UnknownEventType(event_type.to_string()))?;
        handler(publisher, event_data, context)
    }
}

pub fn product_event_registry<TPublisher>() -> EventHandlerRegistry<TPublisher>
where
    TPublisher: ProductEventPublisher + ?Sized + 'static,
{
    let mut registry = EventHandlerRegistry::new();
    registry
        .register(
            PRODUCT_CREATED,
            |publisher: Arc<TPublisher>, event: ProductCreatedEvent, context| async move {
                publisher.publish_product_created(event, context).await
            },
        )
        .register(
            PRODUCT_UPDATED,
            |publisher: Arc<TPublisher>, event: ProductUpdatedEvent, context| async move {
                publisher.publish_product_updated(event, context).await
            },
        )
        .register(
            PRODUCT_DELETED,
            |publisher: Arc<TPublisher>, event: ProductDeletedEvent, context| async move {
                publisher.publish_product_deleted(event, context).await
            },
        );
    registry
}
