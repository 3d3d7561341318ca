//! Cache types for catalog API responses.

use green_earth_core::{Category, Product, ProductId};

/// Cache key for categories and product details.
///
/// Product listings are never cached so a selection always shows fresh data.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Product(Box<Product>),
}
