use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::core::product::ProductDto;
use crate::modules::products::use_cases::application_error::ApplicationError;
use std::sync::Arc;

pub struct GetProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    repository: Arc<TRepository>,
}

impl<TRepository> GetProductHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    pub fn new(repository: Arc<TRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, product_id: &str) -> Result<ProductDto, ApplicationError> {
        let product = self.repository.get(product_id).await?;
        Ok(product.as_dto())
    }
}
