//! In-memory cart and wishlist store.
//!
//! Implements [`CartStore`] and [`WishlistStore`] over a single mutex so each
//! operation is atomic, matching the guarantees of the `PostgreSQL` adapters.
//! Used by unit and integration tests; products must be inserted up front.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use shopfront_core::{CartEntryId, ProductId, Quantity, UserId, WishlistEntryId};

use super::RepositoryError;
use crate::models::{CartEntry, Product, WishlistEntry};
use crate::services::{CartStore, WishlistStore};

#[derive(Debug, Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    // BTreeMap keyed by serial ID keeps insertion order for listing.
    cart: BTreeMap<CartEntryId, CartEntry>,
    wishlist: BTreeMap<WishlistEntryId, WishlistEntry>,
    next_cart_id: i32,
    next_wishlist_id: i32,
}

impl MemoryState {
    fn product(&self, id: ProductId) -> Result<&Product, RepositoryError> {
        self.products.get(&id).ok_or(RepositoryError::NotFound)
    }

    fn owned_cart_entry(&mut self, id: CartEntryId, user_id: UserId) -> Option<&mut CartEntry> {
        self.cart.get_mut(&id).filter(|e| e.user_id == user_id)
    }
}

/// Shared in-memory store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already knows about `products`.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        for product in products {
            store.insert_product(product);
        }
        store
    }

    /// Add or replace a product.
    pub fn insert_product(&self, product: Product) {
        self.lock().products.insert(product.id, product);
    }

    /// Remove a product along with every cart and wishlist entry for it.
    pub fn remove_product(&self, id: ProductId) {
        let mut state = self.lock();
        state.products.remove(&id);
        state.cart.retain(|_, e| e.product_id != id);
        state.wishlist.retain(|_, e| e.product_id != id);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn add_or_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(CartEntry, bool), RepositoryError> {
        let mut state = self.lock();
        state.product(product_id)?;

        if let Some(entry) = state
            .cart
            .values_mut()
            .find(|e| e.user_id == user_id && e.product_id == product_id)
        {
            entry.quantity = entry.quantity.increment();
            return Ok((*entry, false));
        }

        state.next_cart_id += 1;
        let entry = CartEntry {
            id: CartEntryId::new(state.next_cart_id),
            user_id,
            product_id,
            quantity: Quantity::ONE,
        };
        state.cart.insert(entry.id, entry);
        Ok((entry, true))
    }

    async fn find(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        Ok(self.lock().owned_cart_entry(entry_id, user_id).copied())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<(CartEntry, Product)>, RepositoryError> {
        let state = self.lock();
        state
            .cart
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| state.product(e.product_id).map(|p| (*e, p.clone())))
            .collect()
    }

    async fn delete(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        if state.owned_cart_entry(entry_id, user_id).is_none() {
            return Ok(false);
        }
        Ok(state.cart.remove(&entry_id).is_some())
    }

    async fn set_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        quantity: Quantity,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        let mut state = self.lock();
        Ok(state.owned_cart_entry(entry_id, user_id).map(|entry| {
            entry.quantity = quantity;
            *entry
        }))
    }

    async fn adjust_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        delta: i32,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        let mut state = self.lock();
        Ok(state.owned_cart_entry(entry_id, user_id).map(|entry| {
            let adjusted = entry.quantity.get().saturating_add(delta);
            entry.quantity = Quantity::new(adjusted).unwrap_or(Quantity::ONE);
            *entry
        }))
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let n = self.lock().cart.values().filter(|e| e.user_id == user_id).count();
        Ok(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn add_if_absent(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(WishlistEntry, bool), RepositoryError> {
        let mut state = self.lock();
        state.product(product_id)?;

        if let Some(entry) = state
            .wishlist
            .values()
            .find(|e| e.user_id == user_id && e.product_id == product_id)
        {
            return Ok((*entry, false));
        }

        state.next_wishlist_id += 1;
        let entry = WishlistEntry {
            id: WishlistEntryId::new(state.next_wishlist_id),
            user_id,
            product_id,
        };
        state.wishlist.insert(entry.id, entry);
        Ok((entry, true))
    }

    async fn list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<(WishlistEntry, Product)>, RepositoryError> {
        let state = self.lock();
        state
            .wishlist
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| state.product(e.product_id).map(|p| (*e, p.clone())))
            .collect()
    }

    async fn delete(
        &self,
        entry_id: WishlistEntryId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let owned = state
            .wishlist
            .get(&entry_id)
            .is_some_and(|e| e.user_id == user_id);
        if !owned {
            return Ok(false);
        }
        Ok(state.wishlist.remove(&entry_id).is_some())
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let n = self
            .lock()
            .wishlist
            .values()
            .filter(|e| e.user_id == user_id)
            .count();
        Ok(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{CategoryId, Price};

    use super::*;

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            category_id: CategoryId::new(1),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(100),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let a = MemoryStore::with_products([product(1)]);
        let b = a.clone();

        CartStore::add_or_increment(&a, UserId::new(1), ProductId::new(1))
            .await
            .unwrap();
        assert_eq!(CartStore::count(&b, UserId::new(1)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_product_cascades() {
        let store = MemoryStore::with_products([product(1), product(2)]);
        let user = UserId::new(1);
        CartStore::add_or_increment(&store, user, ProductId::new(1))
            .await
            .unwrap();
        WishlistStore::add_if_absent(&store, user, ProductId::new(1))
            .await
            .unwrap();
        CartStore::add_or_increment(&store, user, ProductId::new(2))
            .await
            .unwrap();

        store.remove_product(ProductId::new(1));

        assert_eq!(CartStore::count(&store, user).await.unwrap(), 1);
        assert_eq!(WishlistStore::count(&store, user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_quantity_clamps() {
        let store = MemoryStore::with_products([product(1)]);
        let user = UserId::new(1);
        let (entry, _) = CartStore::add_or_increment(&store, user, ProductId::new(1))
            .await
            .unwrap();

        let lowered = store.adjust_quantity(entry.id, user, -5).await.unwrap();
        assert_eq!(lowered.map(|e| e.quantity), Some(Quantity::ONE));

        let raised = store.adjust_quantity(entry.id, user, 4).await.unwrap();
        assert_eq!(raised.map(|e| e.quantity.get()), Some(5));
    }
}
