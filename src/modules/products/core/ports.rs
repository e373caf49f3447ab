// Ports define what the products core needs from the outside world.
//
// - ProductRepository: the entity store. Catalogue mutations also append an
//   outbox entry in the same transaction, so a committed change always has
//   its event.
// - ProductEventPublisher: delivers a typed domain event to the message bus.

use crate::modules::products::core::events::{
    ProductCreatedEvent, ProductDeletedEvent, ProductUpdatedEvent,
};
use crate::modules::products::core::product::Product;
use crate::shared::core::trace_context::TraceContext;
use crate::shared::infrastructure::database::StoreError;
use crate::shared::infrastructure::event_bus::PublishError;
use crate::shared::infrastructure::outbox::OutboxEntry;
use async_trait::async_trait;

/// Result of a create: a product whose id already exists is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted,
    AlreadyExists,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts the product and the entry atomically. When the id already
    /// exists nothing is written, entry included, and `AlreadyExists` is
    /// returned.
    async fn store_with_outbox_entry(
        &self,
        product: &Product,
        entry: &OutboxEntry,
    ) -> Result<StoreOutcome, StoreError>;

    /// Updates attributes, replaces the price brackets and appends the entry
    /// atomically. Fails with `NotFound` and writes nothing when the product
    /// is gone.
    async fn update_with_outbox_entry(
        &self,
        product: &Product,
        entry: &OutboxEntry,
    ) -> Result<(), StoreError>;

    /// Same row changes as `update_with_outbox_entry` without an event, for
    /// state owned by other services (stock level, pricing brackets).
    async fn update(&self, product: &Product) -> Result<(), StoreError>;

    /// Deletes the product with its price brackets and appends the entry
    /// atomically. Fails with `NotFound` and writes nothing when the product
    /// is gone.
    async fn delete_with_outbox_entry(
        &self,
        product_id: &str,
        entry: &OutboxEntry,
    ) -> Result<(), StoreError>;

    async fn get(&self, product_id: &str) -> Result<Product, StoreError>;

    /// All products ordered by name.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}

/// Metadata for one publication: the outbox entry id doubles as the message
/// id, and `link` points back to the request that created the entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishContext {
    pub message_id: String,
    pub link: Option<TraceContext>,
}

#[async_trait]
pub trait ProductEventPublisher: Send + Sync {
    async fn publish_product_created(
        &self,
        event: ProductCreatedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError>;

    async fn publish_product_updated(
        &self,
        event: ProductUpdatedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError>;

    async fn publish_product_deleted(
        &self,
        event: ProductDeletedEvent,
        context: PublishContext,
    ) -> Result<(), PublishError>;
}
