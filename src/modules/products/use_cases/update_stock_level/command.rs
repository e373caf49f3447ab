/// Stock level reported by the inventory service for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStockLevel {
    pub product_id: String,
    pub stock_level: f32,
}
