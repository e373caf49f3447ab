#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteProduct {
    pub product_id: String,
}
