#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub product_id: String,
    pub name: String,
    pub price: f32,
}
