//! Read-only catalog records.
//!
//! Products and categories are owned by the catalog source; once fetched they
//! are never modified, only displayed or copied into the cart.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};

/// A plant offered for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Category display name (e.g., "Fruit Tree").
    pub category: String,
    pub description: String,
}

impl Product {
    /// Slug derived from the product's category name.
    #[must_use]
    pub fn category_slug(&self) -> String {
        category_slug(&self.category)
    }
}

/// A category the catalog can be filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

impl Category {
    /// Slug derived from the category name.
    #[must_use]
    pub fn slug(&self) -> String {
        category_slug(&self.name)
    }
}

/// Derive a URL-safe slug from a category name.
///
/// Lower-cases the name, turns whitespace runs into `-`, strips anything that
/// is not an ASCII word character or `-`, and drops a trailing `-tree`, so
/// `"Fruit Tree"` becomes `"fruit"`.
#[must_use]
pub fn category_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        }
    }

    match slug.strip_suffix("-tree") {
        Some(stripped) => stripped.to_string(),
        None => slug,
    }
}
