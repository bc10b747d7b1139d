//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{CatalogRepository, RepositoryError};
use crate::models::Category;

/// How long the category list is served from memory.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(300);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    categories: Cache<(), Arc<[Category]>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                categories,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// All categories ordered by name, cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the categories can't be loaded.
    pub async fn categories(&self) -> Result<Arc<[Category]>, RepositoryError> {
        if let Some(categories) = self.inner.categories.get(&()).await {
            tracing::debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Arc<[Category]> = CatalogRepository::new(self.pool())
            .list_categories()
            .await?
            .into();

        self.inner
            .categories
            .insert((), Arc::clone(&categories))
            .await;

        Ok(categories)
    }
}
