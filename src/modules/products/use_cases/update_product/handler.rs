use crate::modules::products::core::events::{PRODUCT_UPDATED, ProductUpdatedEvent};
use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::core::product::ProductDto;
use crate::modules::products::use_cases::application_error::ApplicationError;
use crate::modules::products::use_cases::update_product::command::UpdateProduct;
use crate::shared::core::trace_context::TraceContext;
use crate::shared::infrastructure::outbox::OutboxEntry;
use std::sync::Arc;

pub struct UpdateProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    repository: Arc<TRepository>,
}

impl<TRepository> UpdateProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    pub fn new(repository: Arc<TRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        command: UpdateProduct,
        trace: Option<&TraceContext>,
    ) -> Result<ProductDto, ApplicationError> {
        let mut product = self.repository.get(&command.product_id).await?;
        product.update_detail(command.name, command.price)?;

        if !product.updated {
            tracing::debug!(product_id = %product.id, "no changes, update skipped");
            return Ok(product.as_dto());
        }

        let event = ProductUpdatedEvent::from(&product);
        let entry = OutboxEntry::new(PRODUCT_UPDATED, &event, trace)?;
        self.repository
            .update_with_outbox_entry(&product, &entry)
            .await?;

        tracing::info!(product_id = %product.id, outbox_entry_id = %entry.id, "product updated");
        Ok(product.as_dto())
    }
}
