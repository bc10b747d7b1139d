//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Username/password registration and login
//! - `cart` - Cart membership and quantity rules
//! - `wishlist` - Wishlist membership
//!
//! The cart and wishlist services are generic over a storage port
//! ([`CartStore`], [`WishlistStore`]) with a `PostgreSQL` adapter in
//! [`crate::db`] and an in-memory adapter for tests.

pub mod auth;
pub mod cart;
pub mod wishlist;

mod error;

pub use cart::{CartService, CartStore, QuantityUpdate};
pub use error::MembershipError;
pub use wishlist::{WishlistService, WishlistStore};

/// Result of adding a product to a cart or wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added<E> {
    /// The entry after the operation.
    pub entry: E,
    /// `true` if the entry was created, `false` if it already existed.
    pub created: bool,
}
