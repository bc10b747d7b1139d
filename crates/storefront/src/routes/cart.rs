//! Cart route handlers.
//!
//! Every handler takes [`RequireAuth`]; the cart service is always called
//! with the logged-in user's ID. Mutations answer with a redirect and a
//! flash message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{CartEntryId, ProductId};

use super::Page;
use super::auth::sign_out_missing_account;
use super::redirect::back_or_home;
use crate::db::{CatalogRepository, PgCartStore};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, flash};
use crate::models::CartSummary;
use crate::services::{CartService, MembershipError, QuantityUpdate};
use crate::state::AppState;

/// Cart page path.
const CART_PATH: &str = "/cart";

/// Update quantity form data.
///
/// The raw string is kept so the service decides what counts as valid.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub quantity: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: Page,
    pub cart: CartSummary,
}

fn cart_service(state: &AppState) -> CartService<PgCartStore<'_>> {
    CartService::new(PgCartStore::new(state.pool()))
}

/// Display the cart with line totals and grand total.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: Page,
) -> Result<CartShowTemplate> {
    let cart = cart_service(&state).list(user.id).await?;
    Ok(CartShowTemplate { page, cart })
}

/// Add one unit of a product to the cart.
///
/// Redirects back to the referring page.
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

    let added = match cart_service(&state).add(user.id, product.id).await {
        Ok(added) => added,
        Err(MembershipError::UserNotFound) => return sign_out_missing_account(&session).await,
        Err(e) => return Err(e.into()),
    };

    let product_id = product.id.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    if added.created {
        flash::success(&session, format!("Added {} to your cart.", product.name)).await;
    } else {
        flash::info(
            &session,
            format!("Incremented quantity for {} in your cart.", product.name),
        )
        .await;
    }

    Ok(Redirect::to(&back_or_home(
        &headers,
        &state.config().base_url,
    )))
}

/// Remove an entry from the cart.
#[instrument(skip_all, fields(user_id = %user.id, entry_id = %entry_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(entry_id): Path<CartEntryId>,
) -> Result<Redirect> {
    cart_service(&state).remove(entry_id, user.id).await?;
    flash::success(&session, "Removed item from cart.").await;
    Ok(Redirect::to(CART_PATH))
}

/// Set an entry's quantity. Zero or less removes it.
#[instrument(skip_all, fields(user_id = %user.id, entry_id = %entry_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(entry_id): Path<CartEntryId>,
    Form(form): Form<UpdateQuantityForm>,
) -> Result<Redirect> {
    match cart_service(&state)
        .set_quantity(entry_id, user.id, form.quantity.as_deref())
        .await
    {
        Ok(QuantityUpdate::Updated(_)) => {
            flash::success(&session, "Cart updated.").await;
        }
        Ok(QuantityUpdate::Removed) => {
            flash::warning(
                &session,
                "Item removed from cart because quantity was set to 0.",
            )
            .await;
        }
        Err(MembershipError::InvalidInput(e)) => {
            tracing::debug!(error = %e, "rejected quantity");
            flash::error(&session, "Invalid quantity.").await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to(CART_PATH))
}

/// Add one unit to an entry.
#[instrument(skip_all, fields(user_id = %user.id, entry_id = %entry_id))]
pub async fn increase(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entry_id): Path<CartEntryId>,
) -> Result<Redirect> {
    cart_service(&state).increase(entry_id, user.id).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Take one unit off an entry, stopping at one.
#[instrument(skip_all, fields(user_id = %user.id, entry_id = %entry_id))]
pub async fn decrease(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entry_id): Path<CartEntryId>,
) -> Result<Redirect> {
    cart_service(&state).decrease(entry_id, user.id).await?;
    Ok(Redirect::to(CART_PATH))
}
