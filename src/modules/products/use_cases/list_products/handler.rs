use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::core::product::ProductListDto;
use crate::modules::products::use_cases::application_error::ApplicationError;
use std::sync::Arc;

pub struct ListProductsHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    repository: Arc<TRepository>,
}

impl<TRepository> ListProductsHandler<TRepository>
where
    TRepository: ProductRepository + 'static,
{
    pub fn new(repository: Arc<TRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self) -> Result<Vec<ProductListDto>, ApplicationError> {
        let products = self.repository.list().await?;
        Ok(products.iter().map(|p| p.as_list_dto()).collect())
    }
}
