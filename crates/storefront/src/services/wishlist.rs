//! Wishlist service.
//!
//! A wishlist is a set of products per user: adding a product twice is a
//! no-op that reports the existing entry.

use async_trait::async_trait;
use tracing::instrument;

use shopfront_core::{ProductId, UserId, WishlistEntryId};

use super::{Added, MembershipError};
use crate::db::RepositoryError;
use crate::models::{Product, WishlistEntry, WishlistLine};

/// Storage port for wishlist entries.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Insert the pair unless it already exists.
    ///
    /// Must be a single atomic step. Returns the entry and `true` if it was
    /// inserted. Returns `RepositoryError::NotFound` if the product does not
    /// exist and `RepositoryError::UserNotFound` if the user does not.
    async fn add_if_absent(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(WishlistEntry, bool), RepositoryError>;

    /// All of the user's entries with their products, oldest entry first.
    async fn list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<(WishlistEntry, Product)>, RepositoryError>;

    /// Delete one of the user's entries. Returns `false` if nothing matched.
    async fn delete(
        &self,
        entry_id: WishlistEntryId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError>;

    /// Number of entries on the user's wishlist.
    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError>;
}

/// Wishlist operations for authenticated users.
pub struct WishlistService<S> {
    store: S,
}

impl<S: WishlistStore> WishlistService<S> {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Put a product on the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::ProductNotFound` if the product doesn't exist,
    /// or `MembershipError::UserNotFound` if the account has been deleted.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Added<WishlistEntry>, MembershipError> {
        let (entry, created) = self
            .store
            .add_if_absent(user_id, product_id)
            .await
            .map_err(MembershipError::from_add)?;

        tracing::debug!(entry_id = %entry.id, created, "wishlist add");
        Ok(Added { entry, created })
    }

    /// The user's wishlist with product details.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Repository` if the store fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistLine>, MembershipError> {
        let entries = self.store.list(user_id).await?;
        Ok(entries
            .into_iter()
            .map(|(entry, product)| WishlistLine { entry, product })
            .collect())
    }

    /// Remove an entry from the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::NotFound` if the user has no such entry.
    #[instrument(skip(self), fields(user_id = %user_id, entry_id = %entry_id))]
    pub async fn remove(
        &self,
        entry_id: WishlistEntryId,
        user_id: UserId,
    ) -> Result<(), MembershipError> {
        if self.store.delete(entry_id, user_id).await? {
            Ok(())
        } else {
            Err(MembershipError::NotFound)
        }
    }

    /// Number of entries on the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Repository` if the store fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, MembershipError> {
        Ok(self.store.count(user_id).await?)
    }
}
