use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    #[error("invalid product details: name must be longer than 3 characters and price above 0 (name: {name:?}, price: {price})")]
    InvalidDetails { name: String, price: f32 },

    #[error("product name {0:?} has no letters or digits to derive an id from")]
    NoIdentity(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPrice {
    pub quantity: i32,
    pub price: f32,
}

/// Product as held by the store. `previous_*` and `updated` only record what
/// the latest `update_detail` changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub previous_name: Option<String>,
    pub price: f32,
    pub previous_price: Option<f32>,
    pub stock_level: f32,
    pub updated: bool,
    pub price_breakdown: Vec<ProductPrice>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f32) -> Result<Self, ProductError> {
        let name = name.into();
        validate(&name, price)?;
        let id = product_id_for(&name);
        if id.is_empty() {
            return Err(ProductError::NoIdentity(name));
        }
        Ok(Self {
            id,
            name,
            previous_name: None,
            price,
            previous_price: None,
            stock_level: 0.0,
            updated: false,
            price_breakdown: Vec::new(),
        })
    }

    /// Rehydrates a persisted product; tracking fields start clean.
    pub fn restore(
        id: impl Into<String>,
        name: impl Into<String>,
        price: f32,
        stock_level: f32,
        price_breakdown: Vec<ProductPrice>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            previous_name: None,
            price,
            previous_price: None,
            stock_level,
            updated: false,
            price_breakdown,
        }
    }

    pub fn update_detail(&mut self, name: impl Into<String>, price: f32) -> Result<(), ProductError> {
        let name = name.into();
        validate(&name, price)?;

        if self.name != name {
            self.previous_name = Some(std::mem::replace(&mut self.name, name));
            self.updated = true;
        }
        if self.price != price {
            self.previous_price = Some(self.price);
            self.price = price;
            self.updated = true;
        }
        Ok(())
    }

    pub fn update_stock_level(&mut self, stock_level: f32) {
        self.stock_level = stock_level;
    }

    pub fn clear_pricing(&mut self) {
        self.price_breakdown.clear();
    }

    pub fn add_price(&mut self, quantity: i32, price: f32) {
        self.price_breakdown.push(ProductPrice { quantity, price });
    }

    pub fn as_dto(&self) -> ProductDto {
        ProductDto {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            price_breakdown: self.price_breakdown.clone(),
            stock_level: self.stock_level,
        }
    }

    pub fn as_list_dto(&self) -> ProductListDto {
        ProductListDto {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            stock_level: self.stock_level,
        }
    }
}

/// Identity derived from the name, so repeated creates of the same product
/// resolve to one row: uppercase alphanumerics only.
pub fn product_id_for(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

fn validate(name: &str, price: f32) -> Result<(), ProductError> {
    if name.chars().count() <= 3 || !price.is_finite() || price <= 0.0 {
        return Err(ProductError::InvalidDetails {
            name: name.to_string(),
            price,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub product_id: String,
    pub name: String,
    pub price: f32,
    #[serde(rename = "pricingBrackets")]
    pub price_breakdown: Vec<ProductPrice>,
    pub stock_level: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListDto {
    pub product_id: String,
    pub name: String,
    pub price: f32,
    pub stock_level: f32,
}
