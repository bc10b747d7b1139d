//! Per-page context shared by every rendered template.
//!
//! [`Page`] is an extractor: it reads the logged-in user, loads the cart and
//! wishlist counts for the navigation bar and drains pending flash messages.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::db::{PgCartStore, PgWishlistStore};
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::middleware::flash::take_flashes;
use crate::models::{FlashLevel, FlashMessage};
use crate::services::{CartService, WishlistService};
use crate::state::AppState;

/// Navigation bar data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavContext {
    /// Logged-in username, if any.
    pub username: Option<String>,
    /// Number of entries in the cart (0 for anonymous visitors).
    pub cart_count: i64,
    /// Number of entries on the wishlist (0 for anonymous visitors).
    pub wishlist_count: i64,
}

/// Everything the base layout needs.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub nav: NavContext,
    pub flashes: Vec<FlashMessage>,
}

impl Page {
    /// Show a message on this render instead of the next one.
    pub fn flash_now(&mut self, level: FlashLevel, text: impl Into<String>) {
        self.flashes.push(FlashMessage {
            level,
            text: text.into(),
        });
    }
}

impl FromRequestParts<AppState> for Page {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self::default());
        };

        let Ok(OptionalAuth(user)) = OptionalAuth::from_request_parts(parts, state).await;

        let nav = match user {
            Some(user) => NavContext {
                cart_count: CartService::new(PgCartStore::new(state.pool()))
                    .count(user.id)
                    .await?,
                wishlist_count: WishlistService::new(PgWishlistStore::new(state.pool()))
                    .count(user.id)
                    .await?,
                username: Some(user.username.into_inner()),
            },
            None => NavContext::default(),
        };

        Ok(Self {
            nav,
            flashes: take_flashes(&session).await,
        })
    }
}
