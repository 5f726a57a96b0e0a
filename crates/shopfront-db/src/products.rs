//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopfront_core::{Category, Product};

use crate::DbError;

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, image, stock, rating, \
     review_count, is_active, created_at, updated_at";

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Category display name; the domain conversion rejects unknown values.
    pub category: String,
    pub image: String,
    pub stock: i32,
    pub rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Convert a stored row into the shared domain record.
    ///
    /// Rows that violate domain invariants (unknown category, negative stock
    /// or review count) are corrupt store data; the resolver treats the
    /// resulting error like any other store failure and falls back.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] naming the offending column.
    pub fn into_product(self) -> Result<Product, DbError> {
        let category: Category = self
            .category
            .parse()
            .map_err(|e| DbError::InvalidRow(format!("product '{}': {e}", self.id)))?;

        let stock = u32::try_from(self.stock)
            .map_err(|_| DbError::InvalidRow(format!("product '{}': negative stock", self.id)))?;

        let review_count = u32::try_from(self.review_count).map_err(|_| {
            DbError::InvalidRow(format!("product '{}': negative review count", self.id))
        })?;

        Ok(Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            category,
            image: self.image,
            stock,
            rating: self.rating,
            review_count,
            is_active: self.is_active,
        }
        .normalize())
    }
}

/// List products in stable display order (creation time, then id).
///
/// When `active_only` is set, only rows with `is_active = true` are returned;
/// the predicate matches the fallback catalog's filter exactly.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row fails domain conversion.
pub async fn list_products(pool: &PgPool, active_only: bool) -> Result<Vec<Product>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE ($1 = FALSE OR is_active) \
         ORDER BY created_at, id"
    );

    let rows: Vec<ProductRow> = sqlx::query_as(&sql).bind(active_only).fetch_all(pool).await?;

    rows.into_iter().map(ProductRow::into_product).collect()
}

/// Fetch a single product by identifier.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the row fails domain conversion.
pub async fn get_product(pool: &PgPool, id: &str) -> Result<Option<Product>, DbError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

    let row: Option<ProductRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;

    row.map(ProductRow::into_product).transpose()
}

/// Count all product rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_products(pool: &PgPool) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
