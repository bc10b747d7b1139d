//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{ProductId, WishlistEntryId};

use super::Page;
use super::auth::sign_out_missing_account;
use super::redirect::back_or_home;
use crate::db::{CatalogRepository, PgWishlistStore};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, flash};
use crate::models::WishlistLine;
use crate::services::{MembershipError, WishlistService};
use crate::state::AppState;

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub page: Page,
    pub lines: Vec<WishlistLine>,
}

fn wishlist_service(state: &AppState) -> WishlistService<PgWishlistStore<'_>> {
    WishlistService::new(PgWishlistStore::new(state.pool()))
}

/// Display the wishlist.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: Page,
) -> Result<WishlistShowTemplate> {
    let lines = wishlist_service(&state).list(user.id).await?;
    Ok(WishlistShowTemplate { page, lines })
}

/// Put a product on the wishlist. Adding it twice is harmless.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    headers: HeaderMap,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect> {
    let product = CatalogRepository::new(state.pool())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let added = match wishlist_service(&state).add(user.id, product.id).await {
        Ok(added) => added,
        Err(MembershipError::UserNotFound) => return sign_out_missing_account(&session).await,
        Err(e) => return Err(e.into()),
    };

    if added.created {
        flash::success(&session, format!("Added {} to wishlist.", product.name)).await;
    } else {
        flash::info(
            &session,
            format!("{} is already in your wishlist.", product.name),
        )
        .await;
    }

    Ok(Redirect::to(&back_or_home(
        &headers,
        &state.config().base_url,
    )))
}

/// Remove an entry from the wishlist.
#[instrument(skip_all, fields(user_id = %user.id, entry_id = %entry_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(entry_id): Path<WishlistEntryId>,
) -> Result<Redirect> {
    wishlist_service(&state).remove(entry_id, user.id).await?;
    flash::success(&session, "Removed from wishlist.").await;
    Ok(Redirect::to("/wishlist"))
}
