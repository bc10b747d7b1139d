//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use shopfront_core::ProductId;

use super::Page;
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{Category, Product};
use crate::state::AppState;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: Page,
    pub product: Product,
    pub category: Option<Category>,
}

/// Display a product detail page.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate> {
    let product = CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let category = state
        .categories()
        .await?
        .iter()
        .find(|c| c.id == product.category_id)
        .cloned();

    Ok(ProductShowTemplate {
        page,
        product,
        category,
    })
}
