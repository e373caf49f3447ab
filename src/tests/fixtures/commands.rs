use crate::modules::products::use_cases::create_product::command::CreateProduct;
use crate::modules::products::use_cases::update_product::command::UpdateProduct;

pub struct CreateProductBuilder {
    inner: CreateProduct,
}

impl Default for CreateProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl CreateProductBuilder {
    pub fn new() -> Self {
        Self {
            inner: CreateProduct {
                name: "Widget".to_string(),
                price: 9.99,
            },
        }
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = v.into();
        self
    }

    pub fn price(mut self, v: f32) -> Self {
        self.inner.price = v;
        self
    }

    pub fn build(self) -> CreateProduct {
        self.inner
    }
}

pub struct UpdateProductBuilder {
    inner: UpdateProduct,
}

impl Default for UpdateProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl UpdateProductBuilder {
    /// Targets the default `Widget` with its current details, i.e. a no-op.
    pub fn new() -> Self {
        Self {
            inner: UpdateProduct {
                product_id: "WIDGET".to_string(),
                name: "Widget".to_string(),
                price: 9.99,
            },
        }
    }

    pub fn product_id(mut self, v: impl Into<String>) -> Self {
        self.inner.product_id = v.into();
        self
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = v.into();
        self
    }

    pub fn price(mut self, v: f32) -> Self {
        self.inner.price = v;
        self
    }

    pub fn build(self) -> UpdateProduct {
        self.inner
    }
}
