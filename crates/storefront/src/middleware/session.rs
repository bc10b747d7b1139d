//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! holds the logged-in user and pending flash messages. Session cookies are
//! signed with `STOREFRONT_SESSION_SECRET`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tower_sessions::cookie::{Key, KeyError};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sf_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session layer type used by the storefront.
pub type StorefrontSessionLayer<S> = SessionManagerLayer<S, SignedCookie>;

/// Create the session layer with `PostgreSQL` store.
///
/// The `tower_sessions.session` table is created by `sf-cli migrate`.
///
/// # Errors
///
/// Returns `KeyError` if the session secret is shorter than 64 bytes.
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<StorefrontSessionLayer<PostgresStore>, KeyError> {
    Ok(session_layer(
        PostgresStore::new(pool.clone()),
        config.secure_cookies(),
        signing_key(&config.session_secret)?,
    ))
}

/// Derive the cookie signing key from the configured secret.
///
/// # Errors
///
/// Returns `KeyError` if the secret is shorter than 64 bytes.
pub fn signing_key(secret: &SecretString) -> Result<Key, KeyError> {
    Key::try_from(secret.expose_secret().as_bytes())
}

/// Apply the storefront cookie settings to any session store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(
    store: S,
    secure: bool,
    key: Key,
) -> StorefrontSessionLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
