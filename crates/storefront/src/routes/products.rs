//! Product detail route handler.

use axum::{
    Json,
    extract::{Path, State},
};
use green_earth_core::ProductId;
use tracing::instrument;

use super::views::ProductDetailView;
use crate::catalog::{CatalogError, CatalogSource};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product detail for the modal.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetailView>> {
    let product = match state.catalog().get_product(id).await {
        Ok(product) => product,
        Err(CatalogError::Api { status: 404, .. }) => {
            return Err(AppError::NotFound(format!("product {id}")));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Json(ProductDetailView::from(product)))
}
