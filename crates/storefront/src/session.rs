//! One shopper's page session.
//!
//! A [`StorefrontSession`] owns the cart, the category selection, the menu
//! state and the product listing currently on display, and it drives the
//! catalog fetches those depend on.
//!
//! # Ordering
//!
//! Selecting a category commits the selection and marks the listing as loading
//! before the fetch starts. The session lock is released while the fetch is in
//! flight, so a shopper can pick another category meanwhile. When a response
//! lands its [`SelectionToken`] is checked against the selection state; if a
//! newer selection or retry was issued since, the response is dropped.

use std::sync::Arc;

use green_earth_core::{
    CartEvent, CartLineItem, CartStore, Category, CategorySelection, CategorySelectionState,
    MenuVisibility, Price, Product, ProductId, SelectionToken,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogSource, fallback_categories, fetch_listing};

/// Shown when the unfiltered listing cannot be loaded.
pub const ALL_PRODUCTS_FAILED: &str = "Failed to load plants. Please try again later.";

/// Shown when a category listing cannot be loaded.
pub const CATEGORY_PRODUCTS_FAILED: &str =
    "Failed to load plants for this category. Please try again later.";

/// Where the category menu came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryOrigin {
    /// Not loaded yet.
    #[default]
    Pending,
    Remote,
    /// Built-in table used because the catalog was unreachable.
    Fallback,
}

/// Categories offered for filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMenu {
    pub categories: Vec<Category>,
    pub origin: CategoryOrigin,
}

/// What the product grid should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    Loading,
    /// Fetch succeeded; may be empty.
    Loaded(Vec<Product>),
    /// Fetch failed; the shopper can retry.
    Failed(String),
}

/// The listing together with the selection it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub selection: CategorySelection,
    pub state: ListingState,
}

/// Current cart contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    pub total: Price,
    pub item_count: u32,
}

/// Everything a page needs to render.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub categories: CategoryMenu,
    pub listing: ProductListing,
    pub cart: CartSnapshot,
    pub menu: MenuVisibility,
}

/// Mobile menu interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    Toggle,
    Close,
    Escape,
}

#[derive(Debug)]
struct SessionState {
    selection: CategorySelectionState,
    listing: ListingState,
    categories: CategoryMenu,
    cart: CartStore,
    menu: MenuVisibility,
}

impl SessionState {
    fn listing(&self) -> ProductListing {
        ProductListing {
            selection: self.selection.selected_category(),
            state: self.listing.clone(),
        }
    }

    fn cart(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.cart.items(),
            total: self.cart.total(),
            item_count: self.cart.item_count(),
        }
    }
}

/// A shopper's page session.
pub struct StorefrontSession {
    catalog: Arc<dyn CatalogSource>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for StorefrontSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontSession").finish_non_exhaustive()
    }
}

impl StorefrontSession {
    /// Create a session with an empty cart and the unfiltered selection.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            state: Mutex::new(SessionState {
                selection: CategorySelectionState::new(),
                listing: ListingState::Loading,
                categories: CategoryMenu::default(),
                cart: CartStore::new(),
                menu: MenuVisibility::new(),
            }),
        }
    }

    /// Load categories and the unfiltered listing, as on page load.
    pub async fn initialize(&self) -> SessionSnapshot {
        tokio::join!(self.load_categories(), self.reload_products());
        self.snapshot().await
    }

    /// Fetch the category menu, falling back to the built-in table.
    pub async fn load_categories(&self) -> CategoryMenu {
        let menu = match self.catalog.list_categories().await {
            Ok(categories) => CategoryMenu {
                categories,
                origin: CategoryOrigin::Remote,
            },
            Err(e) => {
                warn!(error = %e, "Error fetching categories, loading fallback categories");
                CategoryMenu {
                    categories: fallback_categories(),
                    origin: CategoryOrigin::Fallback,
                }
            }
        };

        let mut state = self.state.lock().await;
        state.categories = menu.clone();
        menu
    }

    /// Switch the category filter and fetch its products.
    ///
    /// Re-selecting the active category does not refetch.
    pub async fn select_category(&self, selection: CategorySelection) -> ProductListing {
        let token = {
            let mut state = self.state.lock().await;
            let Some(token) = state.selection.select_category(selection) else {
                debug!(%selection, "category already selected");
                return state.listing();
            };
            state.listing = ListingState::Loading;
            token
        };

        info!(%selection, generation = token.generation(), "category selected");
        self.fetch_and_apply(token).await
    }

    /// Reset the filter to all products.
    pub async fn show_all(&self) -> ProductListing {
        self.select_category(CategorySelection::All).await
    }

    /// Refetch the listing for the current selection.
    pub async fn reload_products(&self) -> ProductListing {
        let token = {
            let mut state = self.state.lock().await;
            state.listing = ListingState::Loading;
            state.selection.reissue()
        };
        self.fetch_and_apply(token).await
    }

    async fn fetch_and_apply(&self, token: SelectionToken) -> ProductListing {
        let selection = token.selection();
        let result = fetch_listing(self.catalog.as_ref(), selection).await;

        let mut state = self.state.lock().await;
        if let Err(stale) = state.selection.ensure_current(&token) {
            debug!(%stale, "discarding stale product response");
            return state.listing();
        }

        state.listing = match result {
            Ok(products) => {
                debug!(%selection, count = products.len(), "products loaded");
                ListingState::Loaded(products)
            }
            Err(e) => {
                warn!(error = %e, %selection, "Error fetching products");
                let message = if selection.is_all() {
                    ALL_PRODUCTS_FAILED
                } else {
                    CATEGORY_PRODUCTS_FAILED
                };
                ListingState::Failed(message.to_string())
            }
        };
        state.listing()
    }

    /// Add one unit of a product to the cart.
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        name: String,
        unit_price: Price,
        image: String,
    ) -> (CartEvent, CartSnapshot) {
        let mut state = self.state.lock().await;
        let event = state.cart.add_item(product_id, name, unit_price, image);
        debug!(%product_id, total = %state.cart.total(), "cart updated");
        (event, state.cart())
    }

    /// Remove a product's line from the cart.
    pub async fn remove_from_cart(&self, product_id: ProductId) -> (CartEvent, CartSnapshot) {
        let mut state = self.state.lock().await;
        let event = state.cart.remove_item(product_id);
        if event == CartEvent::NotFound {
            debug!(%product_id, "remove of product not in cart");
        }
        (event, state.cart())
    }

    pub async fn cart(&self) -> CartSnapshot {
        self.state.lock().await.cart()
    }

    pub async fn selected_category(&self) -> CategorySelection {
        self.state.lock().await.selection.selected_category()
    }

    pub async fn listing(&self) -> ProductListing {
        self.state.lock().await.listing()
    }

    /// Apply a mobile menu interaction and return the new state.
    pub async fn menu(&self, action: MenuAction) -> MenuVisibility {
        let mut state = self.state.lock().await;
        match action {
            MenuAction::Toggle => {
                state.menu.toggle();
            }
            MenuAction::Close => state.menu.close(),
            MenuAction::Escape => {
                state.menu.handle_escape();
            }
        }
        state.menu
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            categories: state.categories.clone(),
            listing: state.listing(),
            cart: state.cart(),
            menu: state.menu,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use green_earth_core::CategoryId;
    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::catalog::CatalogError;

    type Gate = oneshot::Receiver<Result<Vec<Product>, CatalogError>>;

    /// Catalog whose listing responses are released by the test.
    struct GatedCatalog {
        categories: Option<Vec<Category>>,
        gates: std::sync::Mutex<HashMap<CategorySelection, Vec<Gate>>>,
        started: mpsc::UnboundedSender<CategorySelection>,
    }

    impl GatedCatalog {
        fn new(
            categories: Option<Vec<Category>>,
        ) -> (Arc<Self>, mpsc::UnboundedReceiver<CategorySelection>) {
            let (started, rx) = mpsc::unbounded_channel();
            let catalog = Arc::new(Self {
                categories,
                gates: std::sync::Mutex::new(HashMap::new()),
                started,
            });
            (catalog, rx)
        }

        fn gate(
            &self,
            selection: CategorySelection,
        ) -> oneshot::Sender<Result<Vec<Product>, CatalogError>> {
            let (tx, rx) = oneshot::channel();
            self.gates
                .lock()
                .unwrap()
                .entry(selection)
                .or_default()
                .push(rx);
            tx
        }

        async fn wait(&self, selection: CategorySelection) -> Result<Vec<Product>, CatalogError> {
            let gate = {
                let mut gates = self.gates.lock().unwrap();
                let queue = gates.get_mut(&selection).unwrap();
                queue.remove(0)
            };
            self.started.send(selection).unwrap();
            gate.await.unwrap()
        }
    }

    #[async_trait]
    impl CatalogSource for GatedCatalog {
        async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
            self.categories
                .clone()
                .ok_or_else(|| CatalogError::Malformed("offline".to_string()))
        }

        async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
            self.wait(CategorySelection::All).await
        }

        async fn list_products_by_category(
            &self,
            id: CategoryId,
        ) -> Result<Vec<Product>, CatalogError> {
            self.wait(CategorySelection::Category(id)).await
        }

        async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
            Err(CatalogError::Api {
                status: 404,
                message: format!("plant {id} not found"),
            })
        }
    }

    fn product(id: i32, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Plant {id}"),
            price: Price::from_whole(100),
            image: String::new(),
            category: category.to_string(),
            description: String::new(),
        }
    }

    fn category(id: i32) -> CategorySelection {
        CategorySelection::Category(CategoryId::new(id))
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (catalog, mut started) = GatedCatalog::new(None);
        let release_a = catalog.gate(category(1));
        let release_b = catalog.gate(category(2));
        let session = Arc::new(StorefrontSession::new(catalog));

        let select_a = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.select_category(category(1)).await }
        });
        assert_eq!(started.recv().await.unwrap(), category(1));

        let select_b = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.select_category(category(2)).await }
        });
        assert_eq!(started.recv().await.unwrap(), category(2));

        release_b.send(Ok(vec![product(20, "Shade Tree")])).unwrap();
        let listing_b = select_b.await.unwrap();
        assert_eq!(
            listing_b.state,
            ListingState::Loaded(vec![product(20, "Shade Tree")])
        );

        release_a.send(Ok(vec![product(10, "Fruit Tree")])).unwrap();
        let listing_a = select_a.await.unwrap();

        // A's late response leaves B's listing in place.
        assert_eq!(listing_a, listing_b);
        assert_eq!(session.listing().await, listing_b);
        assert_eq!(session.selected_category().await, category(2));
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_clobber_listing() {
        let (catalog, mut started) = GatedCatalog::new(None);
        let release_a = catalog.gate(category(1));
        let release_b = catalog.gate(category(2));
        let session = Arc::new(StorefrontSession::new(catalog));

        let select_a = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.select_category(category(1)).await }
        });
        started.recv().await.unwrap();
        let select_b = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.select_category(category(2)).await }
        });
        started.recv().await.unwrap();

        release_a
            .send(Err(CatalogError::Malformed("boom".to_string())))
            .unwrap();
        let listing = select_a.await.unwrap();
        assert_eq!(listing.selection, category(2));
        assert_eq!(listing.state, ListingState::Loading);

        release_b.send(Ok(vec![])).unwrap();
        assert_eq!(select_b.await.unwrap().state, ListingState::Loaded(vec![]));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_selection_and_retry_recovers() {
        let (catalog, _started) = GatedCatalog::new(None);
        let fail = catalog.gate(category(3));
        fail.send(Err(CatalogError::Malformed("bad".to_string())))
            .unwrap();
        let session = StorefrontSession::new(catalog.clone());

        let listing = session.select_category(category(3)).await;
        assert_eq!(
            listing.state,
            ListingState::Failed(CATEGORY_PRODUCTS_FAILED.to_string())
        );
        assert_eq!(session.selected_category().await, category(3));

        catalog
            .gate(category(3))
            .send(Ok(vec![product(30, "Medicinal Tree")]))
            .unwrap();
        let listing = session.reload_products().await;
        assert_eq!(
            listing.state,
            ListingState::Loaded(vec![product(30, "Medicinal Tree")])
        );
    }

    #[tokio::test]
    async fn test_unfiltered_failure_message() {
        let (catalog, _started) = GatedCatalog::new(None);
        catalog
            .gate(CategorySelection::All)
            .send(Err(CatalogError::Malformed("bad".to_string())))
            .unwrap();
        let session = StorefrontSession::new(catalog);

        let listing = session.reload_products().await;
        assert_eq!(
            listing.state,
            ListingState::Failed(ALL_PRODUCTS_FAILED.to_string())
        );
    }

    #[tokio::test]
    async fn test_show_all_refetches_unfiltered() {
        let (catalog, mut started) = GatedCatalog::new(None);
        catalog.gate(category(1)).send(Ok(vec![])).unwrap();
        catalog
            .gate(CategorySelection::All)
            .send(Ok(vec![product(1, "Fruit Tree"), product(2, "Shade Tree")]))
            .unwrap();
        let session = StorefrontSession::new(catalog);

        session.select_category(category(1)).await;
        assert_eq!(started.recv().await.unwrap(), category(1));

        let listing = session.show_all().await;
        assert_eq!(started.recv().await.unwrap(), CategorySelection::All);
        assert_eq!(listing.selection, CategorySelection::All);
        assert!(matches!(listing.state, ListingState::Loaded(ref p) if p.len() == 2));
    }

    #[tokio::test]
    async fn test_reselecting_does_not_refetch() {
        let (catalog, mut started) = GatedCatalog::new(None);
        catalog.gate(category(1)).send(Ok(vec![])).unwrap();
        let session = StorefrontSession::new(catalog);

        session.select_category(category(1)).await;
        started.recv().await.unwrap();

        // No gate queued: a second fetch would panic inside the catalog.
        let listing = session.select_category(category(1)).await;
        assert_eq!(listing.state, ListingState::Loaded(vec![]));
        assert!(started.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_categories_fall_back_when_offline() {
        let (catalog, _started) = GatedCatalog::new(None);
        let session = StorefrontSession::new(catalog);

        let menu = session.load_categories().await;
        assert_eq!(menu.origin, CategoryOrigin::Fallback);
        assert_eq!(menu.categories.len(), 6);
        assert_eq!(session.snapshot().await.categories, menu);
    }

    #[tokio::test]
    async fn test_initialize_loads_categories_and_products() {
        let remote = vec![Category {
            id: CategoryId::new(1),
            name: "Fruit Tree".to_string(),
            description: String::new(),
        }];
        let (catalog, _started) = GatedCatalog::new(Some(remote.clone()));
        catalog
            .gate(CategorySelection::All)
            .send(Ok(vec![product(1, "Fruit Tree")]))
            .unwrap();
        let session = StorefrontSession::new(catalog);

        let snapshot = session.initialize().await;
        assert_eq!(snapshot.categories.origin, CategoryOrigin::Remote);
        assert_eq!(snapshot.categories.categories, remote);
        assert_eq!(
            snapshot.listing.state,
            ListingState::Loaded(vec![product(1, "Fruit Tree")])
        );
        assert_eq!(snapshot.cart.total, Price::ZERO);
    }

    #[tokio::test]
    async fn test_cart_survives_catalog_failures() {
        let (catalog, _started) = GatedCatalog::new(None);
        catalog
            .gate(CategorySelection::All)
            .send(Err(CatalogError::Malformed("bad".to_string())))
            .unwrap();
        let session = StorefrontSession::new(catalog);

        session
            .add_to_cart(ProductId::new(1), "Mango".into(), Price::from_whole(500), String::new())
            .await;
        session.reload_products().await;

        let (event, cart) = session
            .add_to_cart(ProductId::new(1), "Mango".into(), Price::from_whole(500), String::new())
            .await;
        assert!(matches!(event, CartEvent::Incremented(_)));
        assert_eq!(cart.total, Price::from_whole(1000));
        assert_eq!(cart.item_count, 2);

        let (event, cart) = session.remove_from_cart(ProductId::new(5)).await;
        assert_eq!(event, CartEvent::NotFound);
        assert_eq!(cart.items.len(), 1);
    }

    #[tokio::test]
    async fn test_menu_actions() {
        let (catalog, _started) = GatedCatalog::new(None);
        let session = StorefrontSession::new(catalog);

        assert!(session.menu(MenuAction::Toggle).await.is_open());
        assert!(!session.menu(MenuAction::Escape).await.is_open());
        assert!(!session.menu(MenuAction::Escape).await.is_open());
        session.menu(MenuAction::Toggle).await;
        assert!(!session.menu(MenuAction::Close).await.is_open());
    }
}
