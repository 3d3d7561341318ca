//! Catalog source: where categories and plants come from.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam the session drives; the HTTP
//!   [`CatalogClient`] is the production implementation
//! - The remote API is the source of truth - product listings are fetched fresh
//!   on every selection, only categories and product details are cached
//!   (`moka`, TTL from configuration)
//! - When categories cannot be fetched, [`fallback_categories`] stands in
//!
//! # Example
//!
//! ```rust,ignore
//! use green_earth_storefront::catalog::{CatalogClient, CatalogSource};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//!
//! let categories = client.list_categories().await?;
//! let plants = client.list_products_by_category(categories[0].id).await?;
//! ```

mod cache;
mod client;
mod fallback;
#[cfg(test)]
pub(crate) mod stub;
mod wire;

pub use client::CatalogClient;
pub use fallback::fallback_categories;

use async_trait::async_trait;
use green_earth_core::{Category, CategoryId, CategorySelection, Product, ProductId};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
///
/// Any of these means "no data": callers never see partial results.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

/// Read access to the plant catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All categories, in catalog order.
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Every product.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Products in one category. Unknown ids yield an empty list or an error,
    /// depending on the source.
    async fn list_products_by_category(&self, id: CategoryId)
    -> Result<Vec<Product>, CatalogError>;

    /// One product, for the detail view.
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError>;
}

/// Fetch the product list a selection should display.
///
/// # Errors
///
/// Propagates the source's [`CatalogError`].
pub async fn fetch_listing(
    source: &dyn CatalogSource,
    selection: CategorySelection,
) -> Result<Vec<Product>, CatalogError> {
    match selection {
        CategorySelection::All => source.list_products().await,
        CategorySelection::Category(id) => source.list_products_by_category(id).await,
    }
}
