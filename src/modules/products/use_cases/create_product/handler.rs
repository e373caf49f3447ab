use crate::modules::products::core::events::{PRODUCT_CREATED, ProductCreatedEvent};
use crate::modules::products::core::ports::{ProductRepository, StoreOutcome};
use crate::modules::products::core::product::{Product, ProductDto};
use crate::modules::products::use_cases::application_error::ApplicationError;
use crate::modules::products::use_cases::create_product::command::CreateProduct;
use crate::shared::core::trace_context::TraceContext;
use crate::shared::infrastructure::outbox::OutboxEntry;
use std::sync::Arc;

pub struct CreateProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    repository: Arc<TRepository>,
}

impl<TRepository> CreateProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    pub fn new(repository: Arc<TRepository>) -> Self {
        Self { repository }
    }

    /// Creating a product whose identity already exists returns the stored
    /// product and writes nothing, also when a concurrent create wins between
    /// the lookup and the insert.
    pub async fn handle(
        &self,
        command: CreateProduct,
        trace: Option<&TraceContext>,
    ) -> Result<ProductDto, ApplicationError> {
        let product = Product::new(command.name, command.price)?;

        match self.repository.get(&product.id).await {
            Ok(existing) => {
                tracing::info!(product_id = %existing.id, "product already exists, create ignored");
                return Ok(existing.as_dto());
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }

        let event = ProductCreatedEvent::from(&product);
        let entry = OutboxEntry::new(PRODUCT_CREATED, &event, trace)?;
        match self
            .repository
            .store_with_outbox_entry(&product, &entry)
            .await?
        {
            StoreOutcome::Inserted => {
                tracing::info!(product_id = %product.id, outbox_entry_id = %entry.id, "product created");
                Ok(product.as_dto())
            }
            StoreOutcome::AlreadyExists => {
                let existing = self.repository.get(&product.id).await?;
                tracing::info!(product_id = %existing.id, "product created concurrently, create ignored");
                Ok(existing.as_dto())
            }
        }
    }
}
