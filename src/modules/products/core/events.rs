use crate::modules::products::core::product::Product;
use serde::{Deserialize, Serialize};

pub const PRODUCT_CREATED: &str = "product.productCreated";
pub const PRODUCT_UPDATED: &str = "product.productUpdated";
pub const PRODUCT_DELETED: &str = "product.productDeleted";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreatedEvent {
    pub product_id: String,
    pub name: String,
    pub price: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub price: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdatedEvent {
    pub product_id: String,
    pub previous: ProductDetails,
    pub new: ProductDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeletedEvent {
    pub product_id: String,
}

impl From<&Product> for ProductCreatedEvent {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
        }
    }
}

impl From<&Product> for ProductUpdatedEvent {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            previous: ProductDetails {
                name: product
                    .previous_name
                    .clone()
                    .unwrap_or_else(|| product.name.clone()),
                price: product.previous_price.unwrap_or(product.price),
            },
            new: ProductDetails {
                name: product.name.clone(),
                price: product.price,
            },
        }
    }
}

#[cfg(test)]
mod product_events_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_capture_previous_and_new_details() {
        let mut product = Product::new("Widget", 9.99).expect("product");
        product.update_detail("Widget", 11.0).expect("update");

        let event = ProductUpdatedEvent::from(&product);

        assert_eq!(event.previous.name, "Widget");
        assert_eq!(event.previous.price, 9.99);
        assert_eq!(event.new.price, 11.0);
    }

    #[rstest]
    fn it_should_serialize_the_created_event_in_camel_case() {
        let product = Product::new("Widget", 9.99).expect("product");
        let json = serde_json::to_value(ProductCreatedEvent::from(&product)).expect("json");
        assert_eq!(json["productId"], "WIDGET");
        assert_eq!(json["name"], "Widget");
    }
}
