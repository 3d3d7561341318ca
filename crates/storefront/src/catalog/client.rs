//! HTTP client for the catalog API.
//!
//! Uses `reqwest` for transport and caches categories and product details
//! using `moka`.

use std::sync::Arc;

use async_trait::async_trait;
use green_earth_core::{Category, CategoryId, Product, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::wire::{parse_categories, parse_plant, parse_plants};
use super::{CatalogError, CatalogSource};
use crate::config::CatalogConfig;

/// Longest slice of an error body kept in logs and errors.
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the catalog API.
///
/// Cheap to clone; clones share the connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("green-earth-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET an endpoint relative to the base URL and return the body text.
    async fn get(&self, path: &str) -> Result<String, CatalogError> {
        let url = self.inner.base_url.join(path)?;
        debug!(%url, "catalog request");

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            tracing::warn!(
                status = %status,
                body = %message,
                path,
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("categories served from cache");
            return Ok(categories);
        }

        let categories = parse_categories(&self.get("categories").await?)?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        parse_plants(&self.get("plants").await?)
    }

    #[instrument(skip(self), fields(category = %id))]
    async fn list_products_by_category(
        &self,
        id: CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        parse_plants(&self.get(&format!("category/{id}")).await?)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("product served from cache");
            return Ok(*product);
        }

        let product = parse_plant(&self.get(&format!("plant/{id}")).await?)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use green_earth_core::Price;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::parse_base_url;

    #[derive(Clone, Default)]
    struct Hits {
        categories: Arc<AtomicUsize>,
        plant: Arc<AtomicUsize>,
    }

    fn plant(id: i32, category: &str, price: u32) -> Value {
        json!({
            "id": id,
            "name": format!("Plant {id}"),
            "image": format!("https://i.ibb.co/{id}.jpg"),
            "category": category,
            "description": "A plant.",
            "price": price,
        })
    }

    async fn categories(State(hits): State<Hits>) -> Json<Value> {
        hits.categories.fetch_add(1, Ordering::SeqCst);
        Json(json!({
            "status": true,
            "categories": [{"id": 1, "category_name": "Fruit Tree", "small_description": "Fruits"}]
        }))
    }

    async fn plants() -> Json<Value> {
        Json(json!({"status": true, "plants": [plant(1, "Fruit Tree", 500), plant(2, "Shade Tree", 300)]}))
    }

    async fn by_category(Path(id): Path<i32>) -> (StatusCode, Json<Value>) {
        if id == 1 {
            (StatusCode::OK, Json(json!({"status": true, "plants": [plant(1, "Fruit Tree", 500)]})))
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": false})))
        }
    }

    async fn detail(State(hits): State<Hits>, Path(id): Path<i32>) -> Json<Value> {
        hits.plant.fetch_add(1, Ordering::SeqCst);
        Json(json!({"status": true, "plants": plant(id, "Fruit Tree", 500)}))
    }

    async fn spawn_catalog() -> (CatalogClient, Hits) {
        let hits = Hits::default();
        let app = Router::new()
            .route("/api/categories", get(categories))
            .route("/api/plants", get(plants))
            .route("/api/category/{id}", get(by_category))
            .route("/api/plant/{id}", get(detail))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = CatalogConfig {
            base_url: parse_base_url(&format!("http://{addr}/api")).unwrap(),
            timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
        };
        (CatalogClient::new(&config).unwrap(), hits)
    }

    #[tokio::test]
    async fn test_lists_products() {
        let (client, _) = spawn_catalog().await;
        let plants = client.list_products().await.unwrap();
        assert_eq!(plants.len(), 2);
        assert_eq!(plants[1].price, Price::from_whole(300));
    }

    #[tokio::test]
    async fn test_lists_products_by_category() {
        let (client, _) = spawn_catalog().await;
        let plants = client
            .list_products_by_category(CategoryId::new(1))
            .await
            .unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].category, "Fruit Tree");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (client, _) = spawn_catalog().await;
        let err = client
            .list_products_by_category(CategoryId::new(9))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_categories_are_cached() {
        let (client, hits) = spawn_catalog().await;
        let first = client.list_categories().await.unwrap();
        let second = client.list_categories().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(hits.categories.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_product_detail_is_cached_per_id() {
        let (client, hits) = spawn_catalog().await;
        client.get_product(ProductId::new(3)).await.unwrap();
        client.get_product(ProductId::new(3)).await.unwrap();
        let other = client.get_product(ProductId::new(4)).await.unwrap();
        assert_eq!(other.id, ProductId::new(4));
        assert_eq!(hits.plant.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_http_error() {
        let config = CatalogConfig {
            base_url: parse_base_url("http://127.0.0.1:9/api").unwrap(),
            timeout: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(60),
        };
        let client = CatalogClient::new(&config).unwrap();
        assert!(matches!(
            client.list_categories().await.unwrap_err(),
            CatalogError::Http(_)
        ));
    }
}
