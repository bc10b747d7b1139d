//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::CategoryId;

use super::Page;
use crate::db::CatalogRepository;
use crate::error::Result;
use crate::filters;
use crate::models::{Category, Product};
use crate::state::AppState;

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Category ID to filter by. Kept as a string so junk values don't
    /// reject the whole request.
    pub category: Option<String>,
}

/// Which products the home page lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No filter requested.
    All,
    /// A well-formed category ID.
    Category(CategoryId),
    /// A filter that can't match any category.
    Nothing,
}

impl HomeQuery {
    /// Interpret the `category` parameter. Blank means no filter.
    #[must_use]
    pub fn filter(&self) -> CategoryFilter {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => CategoryFilter::All,
            Some(raw) => raw
                .parse::<CategoryId>()
                .map_or(CategoryFilter::Nothing, CategoryFilter::Category),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: Page,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub selected_category: Option<Category>,
}

/// Display the home page.
///
/// `?category=<id>` restricts the product list. An unknown ID yields an
/// empty list with no category selected.
#[instrument(skip_all, fields(category = ?query.category))]
pub async fn home(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<HomeQuery>,
) -> Result<HomeTemplate> {
    let catalog = CatalogRepository::new(state.pool());
    let categories = state.categories().await?.to_vec();

    let (products, selected_category) = match query.filter() {
        CategoryFilter::All => (catalog.list_products(None).await?, None),
        CategoryFilter::Category(id) => (
            catalog.list_products(Some(id)).await?,
            catalog.get_category(id).await?,
        ),
        CategoryFilter::Nothing => (Vec::new(), None),
    };

    Ok(HomeTemplate {
        page,
        categories,
        products,
        selected_category,
    })
}
