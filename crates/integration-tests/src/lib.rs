//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! # Engine and HTTP gate tests (no database needed)
//! cargo test -p shopfront-integration-tests
//!
//! # Live tests against a running storefront with a migrated, seeded database
//! STOREFRONT_BASE_URL=http://localhost:3000 cargo test -p shopfront-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `membership_engine` - Cart and wishlist scenarios over the in-memory store
//! - `storefront_http` - Router-level tests driven with `tower::ServiceExt::oneshot`
//! - `storefront_live` - End-to-end flows over HTTP (ignored by default)

use axum::Router;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;

use shopfront_core::{CategoryId, Price, ProductId};
use shopfront_storefront::config::{SentryConfig, StorefrontConfig};
use shopfront_storefront::middleware::{session_layer, signing_key};
use shopfront_storefront::models::Product;
use shopfront_storefront::routes;
use shopfront_storefront::state::AppState;

/// Public origin used by [`test_app`].
pub const TEST_BASE_URL: &str = "http://shop.test";

/// Never connected to; requests that reach the database fail.
const UNREACHABLE_DATABASE_URL: &str = "postgres://shopfront@127.0.0.1:1/shopfront_test";

/// A product in category 1.
#[must_use]
pub fn product(id: i32, name: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        category_id: CategoryId::new(1),
        name: name.to_string(),
        description: String::new(),
        price: Price::from_cents(cents),
        image_url: None,
    }
}

/// Storefront configuration for tests.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from(UNREACHABLE_DATABASE_URL),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: TEST_BASE_URL.to_string(),
        session_secret: SecretString::from("k".repeat(64)),
        sentry: SentryConfig::default(),
    }
}

/// The full storefront router with in-memory sessions and a lazy pool.
///
/// Must be called from within a Tokio runtime.
///
/// # Panics
///
/// Panics if the test configuration is invalid.
#[must_use]
pub fn test_app() -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy(UNREACHABLE_DATABASE_URL)
        .expect("test database URL parses");
    let key = signing_key(&config.session_secret).expect("test session secret is 64 bytes");
    let sessions = session_layer(tower_sessions::MemoryStore::default(), false, key);

    routes::app(AppState::new(config, pool), sessions)
}

/// Base URL of a running storefront for live tests.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
