//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Home page (?category=<id> filters)
//! GET  /health                     - Health check
//! GET  /health/ready               - Readiness check (database)
//!
//! # Products
//! GET  /products/{id}              - Product detail
//!
//! # Cart (requires auth)
//! GET  /cart                       - Cart page
//! POST /cart/add/{product_id}      - Add one unit, redirect back
//! POST /cart/update/{entry_id}     - Set quantity (0 removes)
//! POST /cart/increase/{entry_id}   - Quantity + 1
//! POST /cart/decrease/{entry_id}   - Quantity - 1, never below 1
//! POST /cart/remove/{entry_id}     - Remove entry
//!
//! # Wishlist (requires auth)
//! GET  /wishlist                   - Wishlist page
//! POST /wishlist/add/{product_id}  - Add if absent, redirect back
//! POST /wishlist/remove/{entry_id} - Remove entry
//!
//! # Auth
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Login action (rate limited)
//! GET  /auth/register              - Register page
//! POST /auth/register              - Register action (rate limited)
//! POST /auth/logout                - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod page;
pub mod products;
pub mod redirect;
pub mod wishlist;

pub use page::{NavContext, Page};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::middleware::{
    StorefrontSessionLayer, auth_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Static assets directory, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Create the auth routes router.
///
/// Only the credential-checking POSTs are rate limited.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{product_id}", post(cart::add))
        .route("/update/{entry_id}", post(cart::update))
        .route("/increase/{entry_id}", post(cart::increase))
        .route("/decrease/{entry_id}", post(cart::decrease))
        .route("/remove/{entry_id}", post(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add/{product_id}", post(wishlist::add))
        .route("/remove/{entry_id}", post(wishlist::remove))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/auth", auth_routes())
}

/// Build the full application with middleware and state.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<Store>(state: AppState, session_layer: StorefrontSessionLayer<Store>) -> Router
where
    Store: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
