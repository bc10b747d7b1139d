//! `PostgreSQL` wishlist store.

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_core::{CategoryId, Price, ProductId, UserId, WishlistEntryId};

use super::RepositoryError;
use crate::models::{Product, WishlistEntry};
use crate::services::WishlistStore;

#[derive(sqlx::FromRow)]
struct WishlistEntryRow {
    id: WishlistEntryId,
    user_id: UserId,
    product_id: ProductId,
}

impl From<WishlistEntryRow> for WishlistEntry {
    fn from(r: WishlistEntryRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            product_id: r.product_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WishlistLineRow {
    #[sqlx(flatten)]
    entry: WishlistEntryRow,
    category_id: CategoryId,
    name: String,
    description: String,
    price: Price,
    image_url: Option<String>,
}

/// Wishlist store backed by `storefront.wishlist_entry`.
pub struct PgWishlistStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgWishlistStore<'a> {
    /// Create a new wishlist store.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistStore for PgWishlistStore<'_> {
    async fn add_if_absent(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(WishlistEntry, bool), RepositoryError> {
        let inserted: Option<WishlistEntryRow> = sqlx::query_as(
            r"
            INSERT INTO storefront.wishlist_entry (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT wishlist_entry_user_product_key DO NOTHING
            RETURNING id, user_id, product_id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "wishlist entry already exists"))?;

        if let Some(row) = inserted {
            return Ok((row.into(), true));
        }

        // Rows are only ever inserted or deleted, so a conflicting row is
        // either still there or was removed in between.
        let existing: Option<WishlistEntryRow> = sqlx::query_as(
            r"
            SELECT id, user_id, product_id
            FROM storefront.wishlist_entry
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        existing
            .map(|row| (row.into(), false))
            .ok_or_else(|| {
                RepositoryError::Conflict("wishlist entry removed concurrently".to_owned())
            })
    }

    async fn list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<(WishlistEntry, Product)>, RepositoryError> {
        let rows: Vec<WishlistLineRow> = sqlx::query_as(
            r"
            SELECT w.id, w.user_id, w.product_id,
                   p.category_id, p.name, p.description, p.price, p.image_url
            FROM storefront.wishlist_entry w
            JOIN storefront.product p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let product = Product {
                    id: r.entry.product_id,
                    category_id: r.category_id,
                    name: r.name,
                    description: r.description,
                    price: r.price,
                    image_url: r.image_url,
                };
                (r.entry.into(), product)
            })
            .collect())
    }

    async fn delete(
        &self,
        entry_id: WishlistEntryId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.wishlist_entry
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(entry_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM storefront.wishlist_entry WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
