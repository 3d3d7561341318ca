//! JSON view models rendered from session snapshots.
//!
//! Views carry everything the page script needs to draw without further
//! lookups: display prices, truncated card text, category slugs and which
//! category entry is highlighted.

use green_earth_core::{
    CartEvent, CartLineItem, Category, CategorySelection, MenuVisibility, Price, Product,
    ProductId,
};
use serde::Serialize;
use uuid::Uuid;

use crate::session::{
    CartSnapshot, CategoryMenu, CategoryOrigin, ListingState, ProductListing, SessionSnapshot,
};

/// Card descriptions longer than this many characters are truncated.
pub const CARD_DESCRIPTION_LIMIT: usize = 100;

/// Label of the unfiltered category entry.
pub const ALL_CATEGORIES_LABEL: &str = "All Trees";
const ALL_CATEGORIES_DESCRIPTION: &str = "View all available trees and plants";

/// Full page state for a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub categories: CategoryMenuView,
    pub listing: ListingView,
    pub cart: CartView,
    pub menu: MenuView,
}

impl SessionView {
    #[must_use]
    pub fn new(session_id: Uuid, snapshot: &SessionSnapshot) -> Self {
        let selected = snapshot.listing.selection;
        Self {
            session_id,
            categories: CategoryMenuView::new(&snapshot.categories, selected),
            listing: ListingView::from(&snapshot.listing),
            cart: CartView::from(&snapshot.cart),
            menu: MenuView::from(snapshot.menu),
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Category sidebar/dropdown contents.
#[derive(Debug, Serialize)]
pub struct CategoryMenuView {
    /// "All Trees" first, then the catalog's categories.
    pub entries: Vec<CategoryEntryView>,
    /// `true` when the built-in table is shown because the catalog was down.
    pub fallback: bool,
}

/// One selectable category entry.
#[derive(Debug, Serialize)]
pub struct CategoryEntryView {
    /// Value to send back when this entry is clicked.
    pub selection: CategorySelection,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub active: bool,
}

impl CategoryMenuView {
    #[must_use]
    pub fn new(menu: &CategoryMenu, selected: CategorySelection) -> Self {
        let all = CategoryEntryView {
            selection: CategorySelection::All,
            name: ALL_CATEGORIES_LABEL.to_string(),
            description: ALL_CATEGORIES_DESCRIPTION.to_string(),
            slug: "all".to_string(),
            active: selected.is_all(),
        };

        let entries = std::iter::once(all)
            .chain(
                menu.categories
                    .iter()
                    .map(|category| CategoryEntryView::new(category, selected)),
            )
            .collect();

        Self {
            entries,
            fallback: menu.origin == CategoryOrigin::Fallback,
        }
    }
}

impl CategoryEntryView {
    fn new(category: &Category, selected: CategorySelection) -> Self {
        Self {
            selection: CategorySelection::Category(category.id),
            name: category.name.clone(),
            description: category.description.clone(),
            slug: category.slug(),
            active: selected.category_id() == Some(category.id),
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product grid state.
#[derive(Debug, Serialize)]
pub struct ListingView {
    pub selection: CategorySelection,
    pub status: ListingStatus,
    pub products: Vec<ProductCardView>,
    /// Error text for a failed load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Loading,
    Loaded,
    /// Loaded, but the category has no products.
    Empty,
    /// Load failed; offer a retry.
    Failed,
}

impl From<&ProductListing> for ListingView {
    fn from(listing: &ProductListing) -> Self {
        let (status, products, message) = match &listing.state {
            ListingState::Loading => (ListingStatus::Loading, Vec::new(), None),
            ListingState::Loaded(products) if products.is_empty() => {
                (ListingStatus::Empty, Vec::new(), None)
            }
            ListingState::Loaded(products) => (
                ListingStatus::Loaded,
                products.iter().map(ProductCardView::from).collect(),
                None,
            ),
            ListingState::Failed(message) => {
                (ListingStatus::Failed, Vec::new(), Some(message.clone()))
            }
        };

        Self {
            selection: listing.selection,
            status,
            products,
            message,
        }
    }
}

/// A product card in the grid.
#[derive(Debug, Serialize)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    /// Description cut to [`CARD_DESCRIPTION_LIMIT`] characters.
    pub summary: String,
    pub category: String,
    pub category_slug: String,
    pub price: Price,
    pub price_display: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            summary: truncate(&product.description, CARD_DESCRIPTION_LIMIT),
            category: product.category.clone(),
            category_slug: product.category_slug(),
            price: product.price,
            price_display: product.price.display(),
        }
    }
}

/// Product detail modal.
#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub description: String,
    pub category: String,
    pub category_slug: String,
    pub price: Price,
    pub price_display: String,
}

impl From<Product> for ProductDetailView {
    fn from(product: Product) -> Self {
        let category_slug = product.category_slug();
        let price_display = product.price.display();
        Self {
            id: product.id,
            name: product.name,
            image: product.image,
            description: product.description,
            category: product.category,
            category_slug,
            price: product.price,
            price_display,
        }
    }
}

/// Cut `text` to `limit` characters, appending `...` if anything was cut.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str("...");
    cut
}

// =============================================================================
// Cart
// =============================================================================

/// Cart drawer contents.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Price,
    pub total_display: String,
    /// Badge count (sum of quantities).
    pub item_count: u32,
    pub is_empty: bool,
}

/// One cart row.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
    pub line_total_display: String,
}

impl From<&CartSnapshot> for CartView {
    fn from(cart: &CartSnapshot) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            total: cart.total,
            total_display: cart.total.display(),
            item_count: cart.item_count,
            is_empty: cart.items.is_empty(),
        }
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        let line_total = line.line_total();
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            image: line.image.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total,
            line_total_display: line_total.display(),
        }
    }
}

/// Response to an add or remove.
#[derive(Debug, Serialize)]
pub struct CartActionView {
    #[serde(flatten)]
    pub event: CartEvent,
    /// Toast text; absent when nothing changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub cart: CartView,
}

impl CartActionView {
    #[must_use]
    pub fn new(event: CartEvent, cart: &CartSnapshot) -> Self {
        Self {
            message: toast_message(&event),
            event,
            cart: CartView::from(cart),
        }
    }
}

/// Toast text for a cart event.
#[must_use]
pub fn toast_message(event: &CartEvent) -> Option<String> {
    match event {
        CartEvent::Added(item) => Some(format!("{} added to cart", item.name)),
        CartEvent::Incremented(item) => Some(format!("{} quantity updated", item.name)),
        CartEvent::Removed(item) => Some(format!("{} removed from cart", item.name)),
        CartEvent::NotFound => None,
    }
}

// =============================================================================
// Menu
// =============================================================================

/// Mobile menu state.
#[derive(Debug, Serialize)]
pub struct MenuView {
    pub open: bool,
    /// Which icon the toggle button shows.
    pub icon: &'static str,
}

impl From<MenuVisibility> for MenuView {
    fn from(menu: MenuVisibility) -> Self {
        Self {
            open: menu.is_open(),
            icon: if menu.is_open() { "close" } else { "hamburger" },
        }
    }
}
