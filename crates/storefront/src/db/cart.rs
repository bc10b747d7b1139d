//! `PostgreSQL` cart store.

use async_trait::async_trait;
use sqlx::PgPool;

use shopfront_core::{CartEntryId, CategoryId, Price, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{CartEntry, Product};
use crate::services::CartStore;

#[derive(sqlx::FromRow)]
struct CartEntryRow {
    id: CartEntryId,
    user_id: UserId,
    product_id: ProductId,
    quantity: Quantity,
}

impl From<CartEntryRow> for CartEntry {
    fn from(r: CartEntryRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            product_id: r.product_id,
            quantity: r.quantity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    entry: CartEntryRow,
    created: bool,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    entry: CartEntryRow,
    category_id: CategoryId,
    name: String,
    description: String,
    price: Price,
    image_url: Option<String>,
}

impl From<CartLineRow> for (CartEntry, Product) {
    fn from(r: CartLineRow) -> Self {
        let product = Product {
            id: r.entry.product_id,
            category_id: r.category_id,
            name: r.name,
            description: r.description,
            price: r.price,
            image_url: r.image_url,
        };
        (r.entry.into(), product)
    }
}

/// Cart store backed by `storefront.cart_entry`.
pub struct PgCartStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgCartStore<'a> {
    /// Create a new cart store.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore<'_> {
    async fn add_or_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(CartEntry, bool), RepositoryError> {
        // xmax is zero only for a freshly inserted tuple.
        let row: UpsertRow = sqlx::query_as(
            r"
            INSERT INTO storefront.cart_entry (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT ON CONSTRAINT cart_entry_user_product_key
            DO UPDATE SET
                quantity = LEAST(cart_entry.quantity::BIGINT + 1, 2147483647)::INTEGER,
                updated_at = NOW()
            RETURNING id, user_id, product_id, quantity, (xmax = 0) AS created
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "cart entry already exists"))?;

        Ok((row.entry.into(), row.created))
    }

    async fn find(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        let row: Option<CartEntryRow> = sqlx::query_as(
            r"
            SELECT id, user_id, product_id, quantity
            FROM storefront.cart_entry
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<(CartEntry, Product)>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(
            r"
            SELECT c.id, c.user_id, c.product_id, c.quantity,
                   p.category_id, p.name, p.description, p.price, p.image_url
            FROM storefront.cart_entry c
            JOIN storefront.product p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.cart_entry
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(entry_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        quantity: Quantity,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        let row: Option<CartEntryRow> = sqlx::query_as(
            r"
            UPDATE storefront.cart_entry
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, product_id, quantity
            ",
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn adjust_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        delta: i32,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        let row: Option<CartEntryRow> = sqlx::query_as(
            r"
            UPDATE storefront.cart_entry
            SET quantity = GREATEST(LEAST(quantity::BIGINT + $3, 2147483647), 1)::INTEGER,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, product_id, quantity
            ",
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(i64::from(delta))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM storefront.cart_entry WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
