//! In-memory catalog for unit tests.

use async_trait::async_trait;
use green_earth_core::{Category, CategoryId, Price, Product, ProductId};

use super::{CatalogError, CatalogSource};

/// Serves fixed data, filtering by category name the way the API does.
/// `None` fields fail with a transport error.
#[derive(Debug, Default)]
pub struct StubCatalog {
    pub categories: Option<Vec<Category>>,
    pub products: Option<Vec<Product>>,
}

impl StubCatalog {
    /// Two categories and three plants.
    pub fn nursery() -> Self {
        Self {
            categories: Some(vec![
                category(1, "Fruit Tree"),
                category(2, "Medicinal Tree"),
            ]),
            products: Some(vec![
                product(1, "Mango Tree", "Fruit Tree", 500),
                product(2, "Neem Tree", "Medicinal Tree", 300),
                product(3, "Guava Tree", "Fruit Tree", 350),
            ]),
        }
    }

    pub fn offline() -> Self {
        Self::default()
    }

    fn products(&self) -> Result<&[Product], CatalogError> {
        self.products
            .as_deref()
            .ok_or_else(|| CatalogError::Malformed("catalog offline".to_string()))
    }
}

pub fn category(id: i32, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        description: format!("{name}s"),
    }
}

pub fn product(id: i32, name: &str, category: &str, price: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::from_whole(price),
        image: format!("https://i.ibb.co/{id}.jpg"),
        category: category.to_string(),
        description: format!("{name} grows well in full sun."),
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.categories
            .clone()
            .ok_or_else(|| CatalogError::Malformed("catalog offline".to_string()))
    }

    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products()?.to_vec())
    }

    async fn list_products_by_category(
        &self,
        id: CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        let products = self.products()?;
        let Some(name) = self
            .categories
            .iter()
            .flatten()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
        else {
            return Ok(Vec::new());
        };
        Ok(products.iter().filter(|p| p.category == name).cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products()?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::Api {
                status: 404,
                message: format!("plant {id} not found"),
            })
    }
}
