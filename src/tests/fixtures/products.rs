use crate::modules::products::adapters::outbound::in_memory_product_repository::InMemoryProductRepository;
use crate::modules::products::core::events::{PRODUCT_CREATED, ProductCreatedEvent};
use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::core::product::Product;
use crate::shared::infrastructure::outbox::OutboxEntry;

pub struct ProductBuilder {
    name: String,
    price: f32,
    stock_level: f32,
    brackets: Vec<(i32, f32)>,
}

impl Default for ProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl ProductBuilder {
    pub fn new() -> Self {
        Self {
            name: "Widget".to_string(),
            price: 9.99,
            stock_level: 0.0,
            brackets: Vec::new(),
        }
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    pub fn price(mut self, v: f32) -> Self {
        self.price = v;
        self
    }

    pub fn stock_level(mut self, v: f32) -> Self {
        self.stock_level = v;
        self
    }

    pub fn price_bracket(mut self, quantity: i32, price: f32) -> Self {
        self.brackets.push((quantity, price));
        self
    }

    pub fn build(self) -> Product {
        let mut product = Product::new(self.name, self.price).expect("valid product");
        product.update_stock_level(self.stock_level);
        for (quantity, price) in self.brackets {
            product.add_price(quantity, price);
        }
        product
    }
}

/// Store holding the default `Widget` and its created entry.
pub async fn seeded_repository() -> InMemoryProductRepository {
    let repository = InMemoryProductRepository::new();
    let product = ProductBuilder::new().build();
    let entry = OutboxEntry::new(PRODUCT_CREATED, &ProductCreatedEvent::from(&product), None)
        .expect("outbox entry");
    repository
        .store_with_outbox_entry(&product, &entry)
        .await
        .expect("seed");
    repository
}

#[cfg(test)]
mod product_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn setters_override_the_defaults() {
        let product = ProductBuilder::new()
            .name("Gadget")
            .price(4.5)
            .stock_level(3.0)
            .price_bracket(10, 4.0)
            .build();

        assert_eq!(product.id, "GADGET");
        assert_eq!(product.price, 4.5);
        assert_eq!(product.stock_level, 3.0);
        assert_eq!(product.price_breakdown.len(), 1);
    }
}
