use sqlx::PgPool;

use shopfront_core::Product;

use crate::DbError;

/// Upsert products into the store.
///
/// Returns the number of products processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_products(pool: &PgPool, products: &[Product]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for product in products {
        sqlx::query(
            "INSERT INTO products \
                 (id, name, description, price, category, image, stock, rating, review_count, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO UPDATE SET \
                 name         = EXCLUDED.name, \
                 description  = EXCLUDED.description, \
                 price        = EXCLUDED.price, \
                 category     = EXCLUDED.category, \
                 image        = EXCLUDED.image, \
                 stock        = EXCLUDED.stock, \
                 rating       = EXCLUDED.rating, \
                 review_count = EXCLUDED.review_count, \
                 is_active    = EXCLUDED.is_active, \
                 updated_at   = NOW()",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category.to_string())
        .bind(&product.image)
        .bind(i64::from(product.stock))
        .bind(product.rating)
        .bind(i64::from(product.review_count))
        .bind(product.is_active)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
