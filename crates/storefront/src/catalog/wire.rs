//! JSON shapes returned by the catalog API and their conversion to core types.
//!
//! Every response is an envelope with a `status` flag and a payload field:
//!
//! ```text
//! GET /categories   {"status": true, "categories": [{"id", "category_name", "small_description"}]}
//! GET /plants       {"status": true, "plants": [{"id", "name", "price", "image", "category", "description"}]}
//! GET /category/:id {"status": true, "plants": [...]}
//! GET /plant/:id    {"status": true, "plants": {...}}
//! ```
//!
//! A `false` status or a missing payload is treated as a malformed response.

use green_earth_core::{Category, CategoryId, Price, Product, ProductId};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::CatalogError;

#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    message: Option<String>,
    categories: Option<Vec<CategoryDto>>,
}

#[derive(Debug, Deserialize)]
struct PlantsEnvelope<T> {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    message: Option<String>,
    plants: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CategoryDto {
    id: CategoryId,
    category_name: String,
    #[serde(default)]
    small_description: String,
}

#[derive(Debug, Deserialize)]
struct PlantDto {
    id: ProductId,
    name: String,
    price: Price,
    #[serde(default)]
    image: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.category_name,
            description: dto.small_description,
        }
    }
}

impl From<PlantDto> for Product {
    fn from(dto: PlantDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            price: dto.price,
            image: dto.image,
            category: dto.category,
            description: dto.description,
        }
    }
}

/// Parse a `/categories` body.
pub(super) fn parse_categories(body: &str) -> Result<Vec<Category>, CatalogError> {
    let envelope: CategoriesEnvelope = decode(body)?;
    let categories = unwrap_payload(
        envelope.status,
        envelope.categories,
        envelope.message,
        "categories",
    )?;
    Ok(categories.into_iter().map(Category::from).collect())
}

/// Parse a `/plants` or `/category/:id` body.
pub(super) fn parse_plants(body: &str) -> Result<Vec<Product>, CatalogError> {
    let envelope: PlantsEnvelope<Vec<PlantDto>> = decode(body)?;
    let plants = unwrap_payload(envelope.status, envelope.plants, envelope.message, "plants")?;
    Ok(plants.into_iter().map(Product::from).collect())
}

/// Parse a `/plant/:id` body.
pub(super) fn parse_plant(body: &str) -> Result<Product, CatalogError> {
    let envelope: PlantsEnvelope<PlantDto> = decode(body)?;
    let plant = unwrap_payload(envelope.status, envelope.plants, envelope.message, "plant")?;
    Ok(plant.into())
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Malformed(e.to_string()))
}

fn unwrap_payload<T>(
    status: bool,
    payload: Option<T>,
    message: Option<String>,
    what: &str,
) -> Result<T, CatalogError> {
    if !status {
        return Err(CatalogError::Malformed(format!(
            "{what} response reported failure: {}",
            message.as_deref().unwrap_or("no message")
        )));
    }
    payload.ok_or_else(|| CatalogError::Malformed(format!("{what} missing from response")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATEGORIES: &str = r#"{
        "status": true,
        "message": "successfully fetched categories",
        "categories": [
            {"id": 1, "category_name": "Fruit Tree", "small_description": "Trees that bear edible fruits like mango, guava, and jackfruit."},
            {"id": 2, "category_name": "Flowering Tree", "small_description": "Trees grown for their beautiful flowers."}
        ]
    }"#;

    const PLANTS: &str = r#"{
        "status": true,
        "message": "successfully fetched plants",
        "plants": [
            {"id": 1, "image": "https://i.ibb.co/mango.jpg", "name": "Mango Tree", "description": "A fast-growing tropical tree.", "category": "Fruit Tree", "price": 500},
            {"id": 2, "image": "https://i.ibb.co/guava.jpg", "name": "Guava Tree", "description": "Hardy and productive.", "category": "Fruit Tree", "price": 350}
        ]
    }"#;

    #[test]
    fn test_parse_categories() {
        let categories = parse_categories(CATEGORIES).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id, CategoryId::new(1));
        assert_eq!(categories[0].name, "Fruit Tree");
        assert!(categories[1].description.starts_with("Trees grown"));
    }

    #[test]
    fn test_parse_plants() {
        let plants = parse_plants(PLANTS).unwrap();
        assert_eq!(plants.len(), 2);
        assert_eq!(plants[0].name, "Mango Tree");
        assert_eq!(plants[0].price, Price::from_whole(500));
        assert_eq!(plants[1].category, "Fruit Tree");
    }

    #[test]
    fn test_parse_empty_category_listing() {
        let plants = parse_plants(r#"{"status": true, "plants": []}"#).unwrap();
        assert!(plants.is_empty());
    }

    #[test]
    fn test_parse_plant_detail() {
        let body = r#"{"status": true, "plants": {"id": 7, "name": "Neem", "price": 300, "image": "", "category": "Medicinal Tree", "description": "Bitter leaves."}}"#;
        let plant = parse_plant(body).unwrap();
        assert_eq!(plant.id, ProductId::new(7));
        assert_eq!(plant.category_slug(), "medicinal");
    }

    #[test]
    fn test_false_status_is_malformed() {
        let err = parse_plants(r#"{"status": false, "message": "no plants"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(msg) if msg.contains("no plants")));
    }

    #[test]
    fn test_missing_payload_is_malformed() {
        let err = parse_categories(r#"{"status": true}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn test_negative_price_is_malformed() {
        let body = r#"{"status": true, "plants": [{"id": 1, "name": "Mango", "price": -5}]}"#;
        assert!(matches!(
            parse_plants(body).unwrap_err(),
            CatalogError::Malformed(_)
        ));
    }

    #[test]
    fn test_not_json_is_malformed() {
        assert!(matches!(
            parse_plants("<html>502 Bad Gateway</html>").unwrap_err(),
            CatalogError::Malformed(_)
        ));
    }
}
