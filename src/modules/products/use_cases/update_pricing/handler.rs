use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::core::product::ProductDto;
use crate::modules::products::use_cases::application_error::ApplicationError;
use crate::modules::products::use_cases::update_pricing::command::UpdatePricing;
use std::sync::Arc;

pub struct UpdatePricingHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    repository: Arc<TRepository>,
}

impl<TRepository> UpdatePricingHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    pub fn new(repository: Arc<TRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, command: UpdatePricing) -> Result<ProductDto, ApplicationError> {
        let mut product = self.repository.get(&command.product_id).await?;
        product.clear_pricing();
        for bracket in command.price_brackets {
            product.add_price(bracket.quantity, bracket.price);
        }
        self.repository.update(&product).await?;

        tracing::info!(
            product_id = %product.id,
            brackets = product.price_breakdown.len(),
            "product pricing updated"
        );
        Ok(product.as_dto())
    }
}
