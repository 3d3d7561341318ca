//! In-memory shopping cart.
//!
//! A [`CartStore`] lives for one page session. Adding a product that is
//! already in the cart bumps its quantity instead of adding a second row, and
//! removing a product drops its line whatever the quantity.

use serde::Serialize;

use crate::types::{Price, ProductId};

/// One row in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    /// Always at least 1.
    pub quantity: u32,
    /// Image URL captured when the product was first added.
    pub image: String,
}

impl CartLineItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Outcome of a cart mutation.
///
/// Serializes as `{"event": "added", "item": {...}}`, or
/// `{"event": "not_found"}` for a removal of an absent product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "item", rename_all = "snake_case")]
pub enum CartEvent {
    /// A new line was appended with quantity 1.
    Added(CartLineItem),
    /// An existing line's quantity went up by one.
    Incremented(CartLineItem),
    /// A line was deleted.
    Removed(CartLineItem),
    /// Nothing to remove.
    NotFound,
}

impl CartEvent {
    /// The line the event refers to, if any.
    #[must_use]
    pub const fn item(&self) -> Option<&CartLineItem> {
        match self {
            Self::Added(item) | Self::Incremented(item) | Self::Removed(item) => Some(item),
            Self::NotFound => None,
        }
    }
}

/// The shopping cart for one session.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    items: Vec<CartLineItem>,
    total: Price,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product.
    ///
    /// The caller supplies catalog-sourced values; nothing is validated. When
    /// the product already has a line, only its quantity changes and the
    /// name, price and image recorded at first add are kept.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Price,
        image: impl Into<String>,
    ) -> CartEvent {
        let event = if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(1);
            CartEvent::Incremented(line.clone())
        } else {
            let line = CartLineItem {
                product_id,
                name: name.into(),
                unit_price,
                quantity: 1,
                image: image.into(),
            };
            self.items.push(line.clone());
            CartEvent::Added(line)
        };

        self.recompute_total();
        event
    }

    /// Remove a product's line entirely.
    pub fn remove_item(&mut self, product_id: ProductId) -> CartEvent {
        let Some(index) = self.items.iter().position(|l| l.product_id == product_id) else {
            return CartEvent::NotFound;
        };

        let line = self.items.remove(index);
        self.recompute_total();
        CartEvent::Removed(line)
    }

    /// Snapshot of the line items in first-added order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.items.clone()
    }

    /// Sum of every line total; zero when empty.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn recompute_total(&mut self) {
        self.total = self.items.iter().map(CartLineItem::line_total).sum();
    }
}
