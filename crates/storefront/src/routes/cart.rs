//! Cart route handlers.
//!
//! The cart lives in the page session. Add and remove respond with the
//! event, a toast message and the updated cart so the page can redraw the
//! drawer and badge in one step.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use green_earth_core::{Price, ProductId};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::sessions::{find_session, json_body};
use super::views::{CartActionView, CartView};
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Add to cart request body.
///
/// Values come from the product card the shopper clicked.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    #[serde(default)]
    pub image: String,
}

/// Display the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CartView>> {
    let session = find_session(&state, id).await?;
    Ok(Json(CartView::from(&session.cart().await)))
}

/// Add one unit of a product.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: std::result::Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<Json<CartActionView>> {
    let request = json_body(payload)?;
    let session = find_session(&state, id).await?;

    let product_id = request.product_id.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    let (event, cart) = session
        .add_to_cart(
            request.product_id,
            request.name,
            request.unit_price,
            request.image,
        )
        .await;
    Ok(Json(CartActionView::new(event, &cart)))
}

/// Remove a product's line, whatever its quantity.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, ProductId)>,
) -> Result<Json<CartActionView>> {
    let session = find_session(&state, id).await?;

    let product = product_id.to_string();
    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", product.as_str())]),
    );

    let (event, cart) = session.remove_from_cart(product_id).await;
    Ok(Json(CartActionView::new(event, &cart)))
}
