//! Integration tests for Green Earth.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against a scripted catalog
//! cargo test -p green-earth-integration-tests
//!
//! # Include tests that call the live catalog API
//! cargo test -p green-earth-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_browsing` - Page load, category switching, stale responses, retries
//! - `storefront_cart` - Cart flows over HTTP
//! - `live_catalog` - Catalog client against the real API (network, ignored)
//!
//! The helpers here start the storefront router on a local port backed by a
//! [`ScriptedCatalog`], so tests drive it over real HTTP with `reqwest`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use green_earth_core::{
    Category, CategoryId, CategorySelection, Price, Product, ProductId,
};
use green_earth_storefront::catalog::{CatalogError, CatalogSource};
use green_earth_storefront::config::SessionConfig;
use green_earth_storefront::routes;
use green_earth_storefront::state::AppState;
use serde_json::Value;

/// In-memory catalog with switchable outages and per-category latency.
#[derive(Debug, Default)]
pub struct ScriptedCatalog {
    categories: Vec<Category>,
    products: Vec<Product>,
    delays: HashMap<CategorySelection, Duration>,
    offline: AtomicBool,
    listing_calls: Mutex<Vec<CategorySelection>>,
}

impl ScriptedCatalog {
    /// Fruit and medicinal trees: Mango, Neem and Guava.
    #[must_use]
    pub fn nursery() -> Self {
        Self {
            categories: vec![
                category(1, "Fruit Tree", "Trees that bear fruit"),
                category(2, "Medicinal Tree", "Trees with healing properties"),
                category(3, "Timber Tree", "Trees grown for wood"),
            ],
            products: vec![
                product(1, "Mango Tree", "Fruit Tree", 500),
                product(2, "Neem Tree", "Medicinal Tree", 300),
                product(3, "Guava Tree", "Fruit Tree", 350),
            ],
            ..Self::default()
        }
    }

    /// Delay listing responses for `selection`.
    #[must_use]
    pub fn with_delay(mut self, selection: CategorySelection, delay: Duration) -> Self {
        self.delays.insert(selection, delay);
        self
    }

    /// Make every call fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Listing requests received so far, in order.
    pub fn listing_calls(&self) -> Vec<CategorySelection> {
        self.listing_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until `count` listing requests have arrived.
    ///
    /// # Panics
    ///
    /// Panics if they do not arrive within five seconds.
    pub async fn wait_for_listing_calls(&self, count: usize) {
        let wait = async {
            while self.listing_calls().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        assert!(
            tokio::time::timeout(Duration::from_secs(5), wait).await.is_ok(),
            "expected {count} listing calls, saw {:?}",
            self.listing_calls()
        );
    }

    fn check_online(&self) -> Result<(), CatalogError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CatalogError::Api {
                status: 503,
                message: "catalog unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn begin_listing(&self, selection: CategorySelection) -> Result<(), CatalogError> {
        self.listing_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(selection);
        if let Some(delay) = self.delays.get(&selection) {
            tokio::time::sleep(*delay).await;
        }
        self.check_online()
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.check_online()?;
        Ok(self.categories.clone())
    }

    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.begin_listing(CategorySelection::All).await?;
        Ok(self.products.clone())
    }

    async fn list_products_by_category(
        &self,
        id: CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        self.begin_listing(CategorySelection::Category(id)).await?;
        let Some(name) = self.categories.iter().find(|c| c.id == id).map(|c| &c.name) else {
            return Ok(Vec::new());
        };
        Ok(self
            .products
            .iter()
            .filter(|p| &p.category == name)
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.check_online()?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::Api {
                status: 404,
                message: format!("plant {id} not found"),
            })
    }
}

#[must_use]
pub fn category(id: i32, name: &str, description: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        description: description.to_string(),
    }
}

#[must_use]
pub fn product(id: i32, name: &str, category: &str, price: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::from_whole(price),
        image: format!("https://i.ibb.co/plant-{id}.jpg"),
        category: category.to_string(),
        description: format!("{name} thrives in warm climates and needs regular watering."),
    }
}

/// A storefront running on a local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the storefront router backed by `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn spawn(catalog: Arc<ScriptedCatalog>) -> Self {
        let state = AppState::new(catalog, SessionConfig::default());
        let app = routes::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Open a page session and return its id with the initial page.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response has no session id.
    #[allow(clippy::expect_used)]
    pub async fn open_session(&self) -> (String, Value) {
        let page: Value = self
            .client
            .post(self.url("/api/sessions"))
            .send()
            .await
            .expect("Failed to open session")
            .json()
            .await
            .expect("Session response was not JSON");
        let id = page["session_id"]
            .as_str()
            .expect("Session response has no id")
            .to_string();
        (id, page)
    }
}

/// Product names in a listing response.
#[must_use]
pub fn product_names(listing: &Value) -> Vec<String> {
    listing["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .filter_map(|p| p["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
