use crate::modules::products::core::events::{PRODUCT_DELETED, ProductDeletedEvent};
use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::use_cases::application_error::ApplicationError;
use crate::modules::products::use_cases::delete_product::command::DeleteProduct;
use crate::shared::core::trace_context::TraceContext;
use crate::shared::infrastructure::outbox::OutboxEntry;
use std::sync::Arc;

pub struct DeleteProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    repository: Arc<TRepository>,
}

impl<TRepository> DeleteProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    pub fn new(repository: Arc<TRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        command: DeleteProduct,
        trace: Option<&TraceContext>,
    ) -> Result<(), ApplicationError> {
        let product = self.repository.get(&command.product_id).await?;

        let event = ProductDeletedEvent {
            product_id: product.id.clone(),
        };
        let entry = OutboxEntry::new(PRODUCT_DELETED, &event, trace)?;
        self.repository
            .delete_with_outbox_entry(&product.id, &entry)
            .await?;

        tracing::info!(product_id = %product.id, outbox_entry_id = %entry.id, "product deleted");
        Ok(())
    }
}
