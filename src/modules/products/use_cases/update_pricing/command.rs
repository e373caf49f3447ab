use crate::modules::products::core::product::ProductPrice;

/// Quantity price brackets calculated by the pricing service. They replace
/// whatever brackets the product had; an empty list clears them.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePricing {
    pub product_id: String,
    pub price_brackets: Vec<ProductPrice>,
}
