// Postgres implementation of the ProductRepository and OutboxRepository ports.
//
// Purpose
// - Persist products, their price brackets and the outbox in one schema so a
//   mutation and its outbox entry commit in the same transaction.
//
// Responsibilities
// - Apply the schema idempotently on startup.
// - Mutations: one transaction per call through the connection factory.
//   Creating an existing product inserts nothing, outbox entry included.
//   Updating or deleting a missing product rolls back with NotFound.
// - Reads and outbox bookkeeping: retried on transient failures, each attempt
//   on a fresh connection.

use crate::modules::products::core::ports::{ProductRepository, StoreOutcome};
use crate::modules::products::core::product::{Product, ProductPrice};
use crate::shared::infrastructure::auth_token::TokenIssuer;
use crate::shared::infrastructure::database::StoreError;
use crate::shared::infrastructure::database::connection_factory::PgConnectionFactory;
use crate::shared::infrastructure::database::retry::{MAX_RETRIES, execute_with_retry};
use crate::shared::infrastructure::outbox::{OutboxEntry, OutboxRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;

const SELECT_PENDING_ENTRIES: &str = r#"
    SELECT id, event_type, event_data, trace_id, span_id, created_at, processed_at
    FROM outbox
    WHERE processed_at IS NULL
    ORDER BY created_at ASC, id ASC
"#;

const MIGRATIONS: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        previous_name TEXT,
        price REAL NOT NULL,
        previous_price REAL,
        stock_level REAL NOT NULL DEFAULT 0,
        updated BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_prices (
        product_id TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        price REAL NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_product_prices_product_id
    ON product_prices(product_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS outbox (
        id TEXT PRIMARY KEY,
        event_type TEXT NOT NULL,
        event_data TEXT NOT NULL,
        trace_id TEXT NOT NULL DEFAULT '',
        span_id TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        processed_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_outbox_processed_at_created_at
    ON outbox(processed_at, created_at)
    "#,
];

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: f32,
    stock_level: f32,
}

#[derive(Debug, FromRow)]
struct PriceRow {
    product_id: String,
    quantity: i32,
    price: f32,
}

#[derive(Debug, FromRow)]
struct OutboxRow {
    id: String,
    event_type: String,
    event_data: String,
    trace_id: String,
    span_id: String,
    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}

impl ProductRow {
    fn into_product(self, prices: Vec<ProductPrice>) -> Product {
        Product::restore(self.id, self.name, self.price, self.stock_level, prices)
    }
}

impl From<PriceRow> for ProductPrice {
    fn from(row: PriceRow) -> Self {
        ProductPrice {
            quantity: row.quantity,
            price: row.price,
        }
    }
}

impl From<OutboxRow> for OutboxEntry {
    fn from(row: OutboxRow) -> Self {
        OutboxEntry {
            id: row.id,
            event_type: row.event_type,
            event_data: row.event_data,
            trace_id: row.trace_id,
            span_id: row.span_id,
            created_at: row.created_at,
            processed_at: row.processed_at,
        }
    }
}

fn group_prices(rows: Vec<PriceRow>) -> HashMap<String, Vec<ProductPrice>> {
    let mut grouped: HashMap<String, Vec<ProductPrice>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.product_id.clone())
            .or_default()
            .push(row.into());
    }
    grouped
}

async fn insert_prices(conn: &mut PgConnection, product: &Product) -> Result<(), StoreError> {
    for bracket in &product.price_breakdown {
        sqlx::query("INSERT INTO product_prices (product_id, quantity, price) VALUES ($1, $2, $3)")
            .bind(&product.id)
            .bind(bracket.quantity)
            .bind(bracket.price)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn delete_prices(conn: &mut PgConnection, product_id: &str) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM product_prices WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn update_product_rows(conn: &mut PgConnection, product: &Product) -> Result<(), StoreError> {
    let updated = sqlx::query(
        r#"
        UPDATE products
        SET name = $2, previous_name = $3, price = $4, previous_price = $5,
            stock_level = $6, updated = $7
        WHERE id = $1
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.previous_name.as_deref())
    .bind(product.price)
    .bind(product.previous_price)
    .bind(product.stock_level)
    .bind(product.updated)
    .execute(&mut *conn)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(StoreError::not_found("product", product.id.as_str()));
    }

    delete_prices(&mut *conn, &product.id).await?;
    insert_prices(&mut *conn, product).await
}

async fn insert_outbox_entry(conn: &mut PgConnection, entry: &OutboxEntry) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO outbox (id, event_type, event_data, trace_id, span_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.event_type)
    .bind(&entry.event_data)
    .bind(&entry.trace_id)
    .bind(&entry.span_id)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub struct PostgresProductRepository<TIssuer>
where
    TIssuer: TokenIssuer,
{
    connections: PgConnectionFactory<TIssuer>,
}

impl<TIssuer> PostgresProductRepository<TIssuer>
where
    TIssuer: TokenIssuer,
{
    pub fn new(connections: PgConnectionFactory<TIssuer>) -> Self {
        Self { connections }
    }

    /// Builds the repository and makes sure the schema exists.
    pub async fn connect(connections: PgConnectionFactory<TIssuer>) -> Result<Self, StoreError> {
        let repository = Self::new(connections);
        repository.run_migrations().await?;
        Ok(repository)
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        execute_with_retry("run_migrations", MAX_RETRIES, || {
            self.connections.with_connection(|pool| async move {
                for statement in MIGRATIONS {
                    sqlx::query(statement).execute(&pool).await?;
                }
                Ok(())
            })
        })
        .await?;
        tracing::info!("product schema ready");
        Ok(())
    }
}

#[async_trait]
impl<TIssuer> ProductRepository for PostgresProductRepository<TIssuer>
where
    TIssuer: TokenIssuer,
{
    async fn store_with_outbox_entry(
        &self,
        product: &Product,
        entry: &OutboxEntry,
    ) -> Result<StoreOutcome, StoreError> {
        let product = product.clone();
        let entry = entry.clone();
        self.connections
            .with_transaction(move |tx| {
                Box::pin(async move {
                    let inserted = sqlx::query(
                        r#"
                        INSERT INTO products (id, name, price, stock_level, updated)
                        VALUES ($1, $2, $3, $4, FALSE)
                        ON CONFLICT (id) DO NOTHING
                        "#,
                    )
                    .bind(&product.id)
                    .bind(&product.name)
                    .bind(product.price)
                    .bind(product.stock_level)
                    .execute(&mut **tx)
                    .await?;

                    if inserted.rows_affected() == 0 {
                        tracing::debug!(product_id = %product.id, "product exists, insert skipped");
                        return Ok(StoreOutcome::AlreadyExists);
                    }
                    insert_prices(&mut **tx, &product).await?;
                    insert_outbox_entry(&mut **tx, &entry).await?;
                    Ok(StoreOutcome::Inserted)
                })
            })
            .await
    }

    async fn update_with_outbox_entry(
        &self,
        product: &Product,
        entry: &OutboxEntry,
    ) -> Result<(), StoreError> {
        let product = product.clone();
        let entry = entry.clone();
        self.connections
            .with_transaction(move |tx| {
                Box::pin(async move {
                    update_product_rows(&mut **tx, &product).await?;
                    insert_outbox_entry(&mut **tx, &entry).await
                })
            })
            .await
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let product = product.clone();
        self.connections
            .with_transaction(move |tx| {
                Box::pin(async move { update_product_rows(&mut **tx, &product).await })
            })
            .await
    }

    async fn delete_with_outbox_entry(
        &self,
        product_id: &str,
        entry: &OutboxEntry,
    ) -> Result<(), StoreError> {
        let product_id = product_id.to_string();
        let entry = entry.clone();
        self.connections
            .with_transaction(move |tx| {
                Box::pin(async move {
                    let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
                        .bind(&product_id)
                        .execute(&mut **tx)
                        .await?;
                    if deleted.rows_affected() == 0 {
                        return Err(StoreError::not_found("product", product_id.as_str()));
                    }
                    delete_prices(&mut **tx, &product_id).await?;
                    insert_outbox_entry(&mut **tx, &entry).await
                })
            })
            .await
    }

    async fn get(&self, product_id: &str) -> Result<Product, StoreError> {
        execute_with_retry("get_product", MAX_RETRIES, || {
            self.connections.with_connection(|pool| async move {
                let row: Option<ProductRow> = sqlx::query_as(
                    "SELECT id, name, price, stock_level FROM products WHERE id = $1",
                )
                .bind(product_id)
                .fetch_optional(&pool)
                .await?;
                let row = row.ok_or_else(|| StoreError::not_found("product", product_id))?;

                let prices: Vec<PriceRow> = sqlx::query_as(
                    r#"
                    SELECT product_id, quantity, price FROM product_prices
                    WHERE product_id = $1 ORDER BY quantity
                    "#,
                )
                .bind(product_id)
                .fetch_all(&pool)
                .await?;

                Ok(row.into_product(prices.into_iter().map(ProductPrice::from).collect()))
            })
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        execute_with_retry("list_products", MAX_RETRIES, || {
            self.connections.with_connection(|pool| async move {
                let rows: Vec<ProductRow> = sqlx::query_as(
                    "SELECT id, name, price, stock_level FROM products ORDER BY name",
                )
                .fetch_all(&pool)
                .await?;
                let prices: Vec<PriceRow> = sqlx::query_as(
                    "SELECT product_id, quantity, price FROM product_prices ORDER BY quantity",
                )
                .fetch_all(&pool)
                .await?;

                let mut prices = group_prices(prices);
                Ok(rows
                    .into_iter()
                    .map(|row| {
                        let brackets = prices.remove(&row.id).unwrap_or_default();
                        row.into_product(brackets)
                    })
                    .collect())
            })
        })
        .await
    }
}

#[async_trait]
impl<TIssuer> OutboxRepository for PostgresProductRepository<TIssuer>
where
    TIssuer: TokenIssuer,
{
    async fn get_unprocessed_entries(&self) -> Result<Vec<OutboxEntry>, StoreError> {
        execute_with_retry("get_unprocessed_entries", MAX_RETRIES, || {
            self.connections.with_connection(|pool| async move {
                let rows: Vec<OutboxRow> = sqlx::query_as(SELECT_PENDING_ENTRIES)
                    .fetch_all(&pool)
                    .await?;
                Ok(rows.into_iter().map(OutboxEntry::from).collect())
            })
        })
        .await
    }

    async fn mark_as_processed(&self, entry_id: &str) -> Result<(), StoreError> {
        execute_with_retry("mark_as_processed", MAX_RETRIES, || {
            self.connections.with_connection(|pool| async move {
                let result = sqlx::query(
                    "UPDATE outbox SET processed_at = NOW() WHERE id = $1 AND processed_at IS NULL",
                )
                .bind(entry_id)
                .execute(&pool)
                .await?;
                if result.rows_affected() == 0 {
                    tracing::warn!(outbox_entry_id = entry_id, "entry already processed or missing");
                }
                Ok(())
            })
        })
        .await
    }
}
