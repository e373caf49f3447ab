use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::core::product::ProductDto;
use crate::modules::products::use_cases::application_error::ApplicationError;
use crate::modules::products::use_cases::update_stock_level::command::UpdateStockLevel;
use std::sync::Arc;

pub struct UpdateStockLevelHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    repository: Arc<TRepository>,
}

impl<TRepository> UpdateStockLevelHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    pub fn new(repository: Arc<TRepository>) -> Self {
        Self { repository }
    }

    /// Stock is owned by the inventory service, so no product event is written.
    pub async fn handle(&self, command: UpdateStockLevel) -> Result<ProductDto, ApplicationError> {
        let mut product = self.repository.get(&command.product_id).await?;
        product.update_stock_level(command.stock_level);
        self.repository.update(&product).await?;

        tracing::info!(
            product_id = %product.id,
            stock_level = product.stock_level,
            "product stock level updated"
        );
        Ok(product.as_dto())
    }
}
