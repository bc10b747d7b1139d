//! Cart service.
//!
//! A cart holds at most one entry per product, each with a quantity of at
//! least one. Quantity changes follow two different rules:
//!
//! - [`CartService::decrease`] stops at one and never deletes.
//! - [`CartService::set_quantity`] deletes the entry when asked for less
//!   than one.
//!
//! Every operation that takes an entry ID also takes the caller's user ID and
//! only touches the entry if both match.

use async_trait::async_trait;
use tracing::instrument;

use shopfront_core::{CartEntryId, ProductId, Quantity, RequestedQuantity, UserId};

use super::{Added, MembershipError};
use crate::db::RepositoryError;
use crate::models::{CartEntry, CartSummary, Product};

/// Storage port for cart entries.
///
/// Every method that takes an entry ID also takes the owning user ID and
/// must treat an entry owned by someone else exactly like a missing one.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Insert the pair with quantity 1, or add one to the existing entry.
    ///
    /// Must be a single atomic step. Returns the entry and `true` if it was
    /// inserted. Returns `RepositoryError::NotFound` if the product does not
    /// exist and `RepositoryError::UserNotFound` if the user does not.
    async fn add_or_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(CartEntry, bool), RepositoryError>;

    /// Find one of the user's entries.
    async fn find(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<Option<CartEntry>, RepositoryError>;

    /// All of the user's entries with their products, oldest entry first.
    async fn list(&self, user_id: UserId) -> Result<Vec<(CartEntry, Product)>, RepositoryError>;

    /// Delete one of the user's entries. Returns `false` if nothing matched.
    async fn delete(&self, entry_id: CartEntryId, user_id: UserId)
    -> Result<bool, RepositoryError>;

    /// Overwrite the quantity of one of the user's entries.
    async fn set_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        quantity: Quantity,
    ) -> Result<Option<CartEntry>, RepositoryError>;

    /// Add `delta` to the quantity in place, clamping the result to at
    /// least one.
    async fn adjust_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        delta: i32,
    ) -> Result<Option<CartEntry>, RepositoryError>;

    /// Number of entries in the user's cart.
    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError>;
}

/// Outcome of [`CartService::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// The entry now has the requested quantity.
    Updated(CartEntry),
    /// The requested quantity was below one, so the entry was deleted.
    Removed,
}

/// Cart operations for authenticated users.
pub struct CartService<S> {
    store: S,
}

impl<S: CartStore> CartService<S> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Add one unit of a product to the user's cart.
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
    ) -> Result<Added<CartEntry>, MembershipError> {
        let (entry, created) = self
            .store
            .add_or_increment(user_id, product_id)
            .await
            .map_err(MembershipError::from_add)?;

        tracing::debug!(entry_id = %entry.id, quantity = %entry.quantity, created, "cart add");
        Ok(Added { entry, created })
    }

    /// The user's cart with line totals and grand total.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Repository` if the store fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: UserId) -> Result<CartSummary, MembershipError> {
        let entries = self.store.list(user_id).await?;
        Ok(CartSummary::from_entries(entries))
    }

    /// Remove an entry from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::NotFound` if the user has no such entry.
    #[instrument(skip(self), fields(user_id = %user_id, entry_id = %entry_id))]
    pub async fn remove(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<(), MembershipError> {
        if self.store.delete(entry_id, user_id).await? {
            Ok(())
        } else {
            Err(MembershipError::NotFound)
        }
    }

    /// Set an entry's quantity from a raw form value.
    ///
    /// Ownership is checked before the value is parsed. A missing value
    /// means one; anything below one deletes the entry.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::NotFound` if the user has no such entry and
    /// `MembershipError::InvalidInput` if the value is not an integer.
    #[instrument(skip(self), fields(user_id = %user_id, entry_id = %entry_id))]
    pub async fn set_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        raw_quantity: Option<&str>,
    ) -> Result<QuantityUpdate, MembershipError> {
        if self.store.find(entry_id, user_id).await?.is_none() {
            return Err(MembershipError::NotFound);
        }

        match RequestedQuantity::parse(raw_quantity)? {
            RequestedQuantity::Remove => {
                self.remove(entry_id, user_id).await?;
                Ok(QuantityUpdate::Removed)
            }
            RequestedQuantity::Set(quantity) => self
                .store
                .set_quantity(entry_id, user_id, quantity)
                .await?
                .map(QuantityUpdate::Updated)
                .ok_or(MembershipError::NotFound),
        }
    }

    /// Add one unit to an entry.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::NotFound` if the user has no such entry.
    #[instrument(skip(self), fields(user_id = %user_id, entry_id = %entry_id))]
    pub async fn increase(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<CartEntry, MembershipError> {
        self.store
            .adjust_quantity(entry_id, user_id, 1)
            .await?
            .ok_or(MembershipError::NotFound)
    }

    /// Take one unit off an entry. An entry at one is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::NotFound` if the user has no such entry.
    #[instrument(skip(self), fields(user_id = %user_id, entry_id = %entry_id))]
    pub async fn decrease(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<CartEntry, MembershipError> {
        self.store
            .adjust_quantity(entry_id, user_id, -1)
            .await?
            .ok_or(MembershipError::NotFound)
    }

    /// Number of entries in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::Repository` if the store fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, MembershipError> {
        Ok(self.store.count(user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{CategoryId, Price, QuantityError};

    use super::*;
    use crate::db::MemoryStore;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_product(Product {
            id: ProductId::new(1),
            category_id: CategoryId::new(1),
            name: "Teapot".to_string(),
            description: String::new(),
            price: Price::from_cents(1000),
            image_url: None,
        });
        store.insert_product(Product {
            id: ProductId::new(2),
            category_id: CategoryId::new(1),
            name: "Mug".to_string(),
            description: String::new(),
            price: Price::from_cents(450),
            image_url: None,
        });
        store
    }

    #[tokio::test]
    async fn test_add_twice_increments() {
        let cart = CartService::new(store());

        let first = cart.add(ALICE, ProductId::new(1)).await.unwrap();
        assert!(first.created);
        assert_eq!(first.entry.quantity.get(), 1);

        let second = cart.add(ALICE, ProductId::new(1)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.entry.id, first.entry.id);
        assert_eq!(second.entry.quantity.get(), 2);

        let summary = cart.list(ALICE).await.unwrap();
        assert_eq!(summary.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let cart = CartService::new(store());
        let err = cart.add(ALICE, ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, MembershipError::ProductNotFound));
        assert_eq!(cart.count(ALICE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increase_twice_totals() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();

        cart.increase(added.entry.id, ALICE).await.unwrap();
        let entry = cart.increase(added.entry.id, ALICE).await.unwrap();
        assert_eq!(entry.quantity.get(), 3);

        let summary = cart.list(ALICE).await.unwrap();
        assert_eq!(summary.lines[0].line_total, Price::from_cents(3000));
        assert_eq!(summary.grand_total, Price::from_cents(3000));
    }

    #[tokio::test]
    async fn test_decrease_floors_at_one() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();

        for _ in 0..3 {
            let entry = cart.decrease(added.entry.id, ALICE).await.unwrap();
            assert_eq!(entry.quantity.get(), 1);
        }

        assert_eq!(cart.count(ALICE).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_decrease_from_three() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();
        cart.set_quantity(added.entry.id, ALICE, Some("3"))
            .await
            .unwrap();

        let entry = cart.decrease(added.entry.id, ALICE).await.unwrap();
        assert_eq!(entry.quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();
        cart.add(ALICE, ProductId::new(2)).await.unwrap();

        let outcome = cart
            .set_quantity(added.entry.id, ALICE, Some("0"))
            .await
            .unwrap();
        assert_eq!(outcome, QuantityUpdate::Removed);

        let summary = cart.list(ALICE).await.unwrap();
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].product.id, ProductId::new(2));
        assert_eq!(summary.grand_total, Price::from_cents(450));
    }

    #[tokio::test]
    async fn test_set_quantity_negative_removes() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();

        let outcome = cart
            .set_quantity(added.entry.id, ALICE, Some("-2"))
            .await
            .unwrap();
        assert_eq!(outcome, QuantityUpdate::Removed);
        assert_eq!(cart.count(ALICE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_quantity_updates() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(2)).await.unwrap();

        let outcome = cart
            .set_quantity(added.entry.id, ALICE, Some("4"))
            .await
            .unwrap();
        let QuantityUpdate::Updated(entry) = outcome else {
            panic!("expected an update, got {outcome:?}");
        };
        assert_eq!(entry.quantity.get(), 4);

        let summary = cart.list(ALICE).await.unwrap();
        assert_eq!(summary.grand_total, Price::from_cents(1800));
    }

    #[tokio::test]
    async fn test_set_quantity_missing_value_means_one() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();
        cart.increase(added.entry.id, ALICE).await.unwrap();

        let outcome = cart
            .set_quantity(added.entry.id, ALICE, None)
            .await
            .unwrap();
        assert!(matches!(outcome, QuantityUpdate::Updated(e) if e.quantity == Quantity::ONE));
    }

    #[tokio::test]
    async fn test_set_quantity_invalid_input_keeps_entry() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();

        let err = cart
            .set_quantity(added.entry.id, ALICE, Some("lots"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MembershipError::InvalidInput(QuantityError::NotANumber(_))
        ));

        let summary = cart.list(ALICE).await.unwrap();
        assert_eq!(summary.lines[0].entry.quantity, Quantity::ONE);
    }

    #[tokio::test]
    async fn test_ownership_checked_before_parsing() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();

        let err = cart
            .set_quantity(added.entry.id, BOB, Some("lots"))
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::NotFound));
    }

    #[tokio::test]
    async fn test_other_user_cannot_touch_entry() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();
        let id = added.entry.id;

        assert!(matches!(
            cart.remove(id, BOB).await,
            Err(MembershipError::NotFound)
        ));
        assert!(matches!(
            cart.increase(id, BOB).await,
            Err(MembershipError::NotFound)
        ));
        assert!(matches!(
            cart.decrease(id, BOB).await,
            Err(MembershipError::NotFound)
        ));
        assert!(matches!(
            cart.set_quantity(id, BOB, Some("0")).await,
            Err(MembershipError::NotFound)
        ));

        let summary = cart.list(ALICE).await.unwrap();
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].entry.quantity, Quantity::ONE);
        assert!(cart.list(BOB).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_then_remove_again() {
        let cart = CartService::new(store());
        let added = cart.add(ALICE, ProductId::new(1)).await.unwrap();

        cart.remove(added.entry.id, ALICE).await.unwrap();
        assert!(matches!(
            cart.remove(added.entry.id, ALICE).await,
            Err(MembershipError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let cart = CartService::new(store());
        let alice = cart.add(ALICE, ProductId::new(1)).await.unwrap();
        let bob = cart.add(BOB, ProductId::new(1)).await.unwrap();

        assert!(alice.created);
        assert!(bob.created);
        assert_ne!(alice.entry.id, bob.entry.id);
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let cart = CartService::new(store());
        cart.add(ALICE, ProductId::new(2)).await.unwrap();
        cart.add(ALICE, ProductId::new(1)).await.unwrap();
        cart.add(ALICE, ProductId::new(2)).await.unwrap();

        let summary = cart.list(ALICE).await.unwrap();
        let ids: Vec<_> = summary.lines.iter().map(|l| l.product.id).collect();
        assert_eq!(ids, vec![ProductId::new(2), ProductId::new(1)]);
        assert_eq!(summary.grand_total, Price::from_cents(1900));
    }
}
