//! Static category table used when the catalog API is unreachable.
//!
//! Only categories fall back; products are never invented.

use green_earth_core::{Category, CategoryId};

const FALLBACK: [(i32, &str, &str); 6] = [
    (1, "Fruit Trees", "Trees that bear edible fruits"),
    (2, "Flowering Trees", "Trees grown for their beautiful flowers"),
    (3, "Shade Trees", "Large trees providing cool shade"),
    (4, "Medicinal Trees", "Trees valued for their healing properties"),
    (5, "Timber Trees", "Trees grown for wood production"),
    (6, "Evergreen Trees", "Trees that stay green year-round"),
];

/// The six built-in categories.
#[must_use]
pub fn fallback_categories() -> Vec<Category> {
    FALLBACK
        .iter()
        .map(|&(id, name, description)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_categories_with_distinct_ids() {
        let categories = fallback_categories();
        assert_eq!(categories.len(), 6);

        let mut ids: Vec<i32> = categories.iter().map(|c| c.id.as_i32()).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }
}
