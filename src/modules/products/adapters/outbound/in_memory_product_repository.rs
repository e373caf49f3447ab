// In memory implementation of the ProductRepository and OutboxRepository ports.
//
// Purpose
// - Support command handler and sweeper tests and local runs without a database.
//
// Responsibilities
// - Keep the same three tables as the relational schema (products,
//   product_prices, outbox).
// - Emulate transactions: work runs against a staged copy that replaces the
//   tables only when every step succeeded.
// - Reads go through the same retry policy as the Postgres store.
// - Fault injection: offline (transient), failing reads, failing outbox inserts.

use crate::modules::products::core::ports::{ProductRepository, StoreOutcome};
use crate::modules::products::core::product::{Product, ProductPrice};
use crate::shared::infrastructure::database::StoreError;
use crate::shared::infrastructure::database::retry::{MAX_RETRIES, execute_with_retry};
use crate::shared::infrastructure::outbox::{OutboxEntry, OutboxRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct ProductRow {
    id: String,
    name: String,
    previous_name: Option<String>,
    price: f32,
    previous_price: Option<f32>,
    stock_level: f32,
    updated: bool,
}

#[derive(Debug, Clone)]
struct PriceRow {
    product_id: String,
    quantity: i32,
    price: f32,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: HashMap<String, ProductRow>,
    product_prices: Vec<PriceRow>,
    outbox: Vec<OutboxEntry>,
}

impl Tables {
    fn product(&self, product_id: &str) -> Option<Product> {
        let row = self.products.get(product_id)?;
        let prices = self
            .product_prices
            .iter()
            .filter(|p| p.product_id == product_id)
            .map(|p| ProductPrice {
                quantity: p.quantity,
                price: p.price,
            })
            .collect();
        Some(Product::restore(
            row.id.clone(),
            row.name.clone(),
            row.price,
            row.stock_level,
            prices,
        ))
    }

    fn update_product(&mut self, product: &Product) -> Result<(), StoreError> {
        let row = self
            .products
            .get_mut(&product.id)
            .ok_or_else(|| StoreError::not_found("product", product.id.as_str()))?;
        row.name = product.name.clone();
        row.previous_name = product.previous_name.clone();
        row.price = product.price;
        row.previous_price = product.previous_price;
        row.stock_level = product.stock_level;
        row.updated = product.updated;
        self.replace_prices(product);
        Ok(())
    }

    fn replace_prices(&mut self, product: &Product) {
        self.product_prices.retain(|p| p.product_id != product.id);
        self.product_prices
            .extend(product.price_breakdown.iter().map(|p| PriceRow {
                product_id: product.id.clone(),
                quantity: p.quantity,
                price: p.price,
            }));
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    tables: RwLock<Tables>,
    offline: bool,
    failing_reads: AtomicU32,
    fail_outbox_inserts: AtomicBool,
    read_attempts: AtomicU32,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    /// The next `count` read attempts fail with a transient error.
    pub fn fail_next_reads(&self, count: u32) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Outbox inserts fail after the product rows were written, so the whole
    /// transaction must roll back.
    pub fn fail_outbox_inserts(&self, fail: bool) {
        self.fail_outbox_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn read_attempts(&self) -> u32 {
        self.read_attempts.load(Ordering::SeqCst)
    }

    pub async fn outbox_entries(&self) -> Vec<OutboxEntry> {
        self.tables.read().await.outbox.clone()
    }

    pub async fn product_count(&self) -> usize {
        self.tables.read().await.products.len()
    }

    pub async fn price_row_count(&self, product_id: &str) -> usize {
        self.tables
            .read()
            .await
            .product_prices
            .iter()
            .filter(|p| p.product_id == product_id)
            .count()
    }

    /// Change tracking columns of a stored row: previous name, previous price
    /// and the updated flag.
    pub async fn change_tracking(
        &self,
        product_id: &str,
    ) -> Option<(Option<String>, Option<f32>, bool)> {
        self.tables
            .read()
            .await
            .products
            .get(product_id)
            .map(|row| (row.previous_name.clone(), row.previous_price, row.updated))
    }

    fn connect(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Transient("connection refused: product store offline".into()));
        }
        Ok(())
    }

    async fn transaction<T>(
        &self,
        work: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.connect()?;
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let value = work(&mut staged)?;
        *tables = staged;
        Ok(value)
    }

    async fn read<T>(&self, query: impl FnOnce(&Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        self.read_attempts.fetch_add(1, Ordering::SeqCst);
        self.connect()?;
        let failing = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(StoreError::Transient("password authentication failed: token expired".into()));
        }
        let tables = self.tables.read().await;
        query(&tables)
    }

    fn insert_outbox(&self, tables: &mut Tables, entry: &OutboxEntry) -> Result<(), StoreError> {
        if self.fail_outbox_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("outbox insert failed".into()));
        }
        if tables.outbox.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::Conflict(format!("outbox entry {} already exists", entry.id)));
        }
        let mut row = entry.clone();
        row.processed_at = None;
        tables.outbox.push(row);
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn store_with_outbox_entry(
        &self,
        product: &Product,
        entry: &OutboxEntry,
    ) -> Result<StoreOutcome, StoreError> {
        self.transaction(|tables| {
            if tables.products.contains_key(&product.id) {
                return Ok(StoreOutcome::AlreadyExists);
            }
            tables.products.insert(
                product.id.clone(),
                ProductRow {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    previous_name: None,
                    price: product.price,
                    previous_price: None,
                    stock_level: product.stock_level,
                    updated: false,
                },
            );
            tables.replace_prices(product);
            self.insert_outbox(tables, entry)?;
            Ok(StoreOutcome::Inserted)
        })
        .await
    }

    async fn update_with_outbox_entry(
        &self,
        product: &Product,
        entry: &OutboxEntry,
    ) -> Result<(), StoreError> {
        self.transaction(|tables| {
            tables.update_product(product)?;
            self.insert_outbox(tables, entry)
        })
        .await
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        self.transaction(|tables| tables.update_product(product)).await
    }

    async fn delete_with_outbox_entry(
        &self,
        product_id: &str,
        entry: &OutboxEntry,
    ) -> Result<(), StoreError> {
        self.transaction(|tables| {
            tables
                .products
                .remove(product_id)
                .ok_or_else(|| StoreError::not_found("product", product_id))?;
            tables.product_prices.retain(|p| p.product_id != product_id);
            self.insert_outbox(tables, entry)
        })
        .await
    }

    async fn get(&self, product_id: &str) -> Result<Product, StoreError> {
        execute_with_retry("get_product", MAX_RETRIES, || {
            self.read(|tables| {
                tables
                    .product(product_id)
                    .ok_or_else(|| StoreError::not_found("product", product_id))
            })
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        execute_with_retry("list_products", MAX_RETRIES, || {
            self.read(|tables| {
                let mut products: Vec<Product> = tables
                    .products
                    .keys()
                    .filter_map(|id| tables.product(id))
                    .collect();
                products.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(products)
            })
        })
        .await
    }
}

#[async_trait]
impl OutboxRepository for InMemoryProductRepository {
    async fn get_unprocessed_entries(&self) -> Result<Vec<OutboxEntry>, StoreError> {
        execute_with_retry("get_unprocessed_entries", MAX_RETRIES, || {
            self.read(|tables| {
                let mut entries: Vec<OutboxEntry> = tables
                    .outbox
                    .iter()
                    .filter(|e| e.processed_at.is_none())
                    .cloned()
                    .collect();
                entries.sort_by(|a, b| {
                    a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))
                });
                Ok(entries)
            })
        })
        .await
    }

    async fn mark_as_processed(&self, entry_id: &str) -> Result<(), StoreError> {
        execute_with_retry("mark_as_processed", MAX_RETRIES, || async {
            self.read(|_| Ok(())).await?;
            let mut tables = self.tables.write().await;
            if let Some(entry) = tables
                .outbox
                .iter_mut()
                .find(|e| e.id == entry_id && e.processed_at.is_none())
            {
                entry.processed_at = Some(Utc::now());
            }
            Ok(())
        })
        .await
    }
}
