//! Database operations for storefront `PostgreSQL`.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `category`, `product` - Read-only catalog
//! - `user`, `user_password` - Site authentication
//! - `cart_entry` - Per-user cart lines, unique per `(user_id, product_id)`
//! - `wishlist_entry` - Per-user wishlist, unique per `(user_id, product_id)`
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopfront-cli -- migrate
//! ```
//!
//! Queries are built with `sqlx::query_as` at runtime so the crate builds
//! without a live database.

pub mod cart;
pub mod catalog;
pub mod memory;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::PgCartStore;
pub use catalog::CatalogRepository;
pub use memory::MemoryStore;
pub use users::UserRepository;
pub use wishlist::PgWishlistStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity (or a row it references) was not found.
    #[error("not found")]
    NotFound,

    /// The user a write was made for no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a write error: foreign-key violations mean a referenced row
    /// is missing, unique violations are conflicts.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_foreign_key_violation() {
                return Self::missing_reference(db_err.constraint());
            }
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
        }
        Self::Database(err)
    }

    /// Map a violated foreign key to the row that is missing.
    ///
    /// Membership tables name their keys `<table>_user_id_fkey` and
    /// `<table>_product_id_fkey`; anything else is reported as `NotFound`.
    fn missing_reference(constraint: Option<&str>) -> Self {
        match constraint {
            Some(name) if name.ends_with("_user_id_fkey") => Self::UserNotFound,
            _ => Self::NotFound,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_user_is_not_a_missing_product() {
        assert!(matches!(
            RepositoryError::missing_reference(Some("cart_entry_user_id_fkey")),
            RepositoryError::UserNotFound
        ));
        assert!(matches!(
            RepositoryError::missing_reference(Some("wishlist_entry_user_id_fkey")),
            RepositoryError::UserNotFound
        ));
    }

    #[test]
    fn test_missing_product_is_not_found() {
        assert!(matches!(
            RepositoryError::missing_reference(Some("cart_entry_product_id_fkey")),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::missing_reference(None),
            RepositoryError::NotFound
        ));
    }
}
