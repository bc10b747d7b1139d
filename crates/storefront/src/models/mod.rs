//! Domain models for storefront.
//!
//! These are validated domain types, separate from the database row types in
//! [`crate::db`].

pub mod catalog;
pub mod membership;
pub mod session;
pub mod user;

pub use catalog::{Category, Product};
pub use membership::{CartEntry, CartLine, CartSummary, WishlistEntry, WishlistLine};
pub use session::{CurrentUser, FlashLevel, FlashMessage, keys as session_keys};
pub use user::User;
